use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use env_logger::{Env, Target};
use std::fs::OpenOptions;
use std::sync::Arc;

use mailboxiq::api::{HttpApi, MailboxApi, SeedFallback};
use mailboxiq::config::{
    Config, Overrides, agent_settings, load_config, log_path, request_timeout, resolve_api_base,
    resolve_seed_path,
};
use mailboxiq::domain::agent::{AgentQuery, AgentReply, task_lines};
use mailboxiq::domain::draft::NewDraft;
use mailboxiq::domain::email::EmailId;
use mailboxiq::domain::prompts::PromptKey;
use mailboxiq::terminal::run_tui;
use mailboxiq::views::inbox::inbox_header;
use mailboxiq::worker::fetch_merged;

#[derive(Parser)]
#[command(name = "mailboxiq")]
#[command(about = "MailboxIQ terminal client (TUI + scriptable commands)", long_about = None)]
struct Cli {
    /// Backend base URL, e.g. http://localhost:5000
    #[arg(long, global = true, env = "MAILBOXIQ_API_BASE")]
    api_base: Option<String>,

    /// `development` or `production`
    #[arg(long = "env", global = true, env = "MAILBOXIQ_ENV")]
    environment: Option<String>,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the TUI (default)
    Tui,

    /// Print the inbox merged with processing results
    Inbox,

    /// Reload the mailbox on the backend and reset processing
    Load,

    /// Categorize and extract tasks for every email
    Process,

    /// Re-process a single email
    Ingest { id: EmailId },

    /// Ask the agent; without --email the whole inbox is in scope
    Ask {
        #[arg(long)]
        email: Option<EmailId>,

        /// Store a draft reply on the backend
        #[arg(long)]
        save_draft: bool,

        instruction: String,
    },

    /// List saved drafts
    Drafts,

    /// Show or change the agent prompts
    Prompts {
        #[command(subcommand)]
        action: PromptsAction,
    },

    /// Check that the backend is up
    Health,
}

#[derive(Subcommand)]
enum PromptsAction {
    Show,
    Set { key: PromptKey, text: String },
}

fn init_logging(to_file: bool) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
    if to_file {
        let path = log_path()?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("cannot open log file {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
    }
    builder.try_init()?;
    Ok(())
}

fn build_api(cfg: &Config, overrides: &Overrides) -> Result<Arc<dyn MailboxApi>> {
    let base = resolve_api_base(cfg, overrides)?;
    let http = HttpApi::new(base, request_timeout(cfg))?;
    let api: Arc<dyn MailboxApi> = match resolve_seed_path(cfg) {
        Some(seed) => Arc::new(SeedFallback::new(http, seed)),
        None => Arc::new(http),
    };
    Ok(api)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cmd = cli.cmd.unwrap_or(Command::Tui);

    init_logging(matches!(cmd, Command::Tui))?;

    let cfg = load_config().map_err(|e| anyhow!("Configuration error: {e}"))?;
    let overrides = Overrides {
        api_base: cli.api_base,
        environment: cli.environment,
    };
    let api = build_api(&cfg, &overrides)?;
    let settings = agent_settings(&cfg);

    match cmd {
        Command::Tui => run_tui(api, settings),

        Command::Inbox => {
            let emails = fetch_merged(api.as_ref())?;
            let processed = emails.iter().filter(|e| e.category.is_some()).count();
            println!("{}", inbox_header(emails.len(), processed as u64));
            for e in &emails {
                let category = e.category.as_deref().unwrap_or("-");
                println!("{:>4}  [{category}]  {}  <{}>", e.id.key(), e.subject, e.sender);
            }
            Ok(())
        }

        Command::Load => {
            let emails = api.reload_inbox()?;
            println!("Inbox loaded: {} emails", emails.len());
            Ok(())
        }

        Command::Process => {
            let count = api.ingest_all()?;
            println!("Processed {count} emails");
            Ok(())
        }

        Command::Ingest { id } => {
            let record = api.ingest_one(&id)?;
            println!(
                "{}: {}",
                record.email_id,
                record.category.as_deref().unwrap_or("uncategorized")
            );
            for line in task_lines(&record.action_items) {
                println!("  {line}");
            }
            Ok(())
        }

        Command::Ask {
            email,
            save_draft,
            instruction,
        } => {
            let subject = match &email {
                Some(id) => Some(
                    api.list_inbox()?
                        .into_iter()
                        .find(|e| &e.id == id)
                        .map(|e| e.subject)
                        .ok_or_else(|| anyhow!("no email with id {id}"))?,
                ),
                None => None,
            };
            let reply = api.agent_query(&AgentQuery {
                email_id: email.clone(),
                instruction,
                tone: settings.tone.clone(),
            })?;
            println!("{}", reply.render(subject.as_deref()));

            if save_draft {
                let AgentReply::Draft(draft) = &reply else {
                    return Err(anyhow!("the agent did not answer with a draft"));
                };
                let created = api.create_draft(&NewDraft {
                    email_id: email,
                    subject: draft.subject_or_default(subject.as_deref()),
                    body: draft.body.clone(),
                    suggested_followups: Vec::new(),
                })?;
                println!("Draft saved ({})", created.id);
            }
            Ok(())
        }

        Command::Drafts => {
            let drafts = api.list_drafts()?;
            if drafts.is_empty() {
                println!("No drafts yet.");
            }
            for d in &drafts {
                let source = d.email_id.as_ref().map(|id| id.to_string());
                println!(
                    "{:>4}  {}  (email {})",
                    d.id.key(),
                    d.subject,
                    source.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }

        Command::Prompts { action } => match action {
            PromptsAction::Show => {
                let prompts = api.get_prompts()?;
                for key in PromptKey::ALL {
                    println!("[{}]\n{}\n", key.label(), prompts.get(key));
                }
                Ok(())
            }
            PromptsAction::Set { key, text } => {
                let mut prompts = api.get_prompts()?;
                prompts.set(key, text);
                api.save_prompts(&prompts)?;
                println!("Prompts saved!");
                Ok(())
            }
        },

        Command::Health => {
            let status = api.health()?;
            println!("{status}");
            Ok(())
        }
    }
}
