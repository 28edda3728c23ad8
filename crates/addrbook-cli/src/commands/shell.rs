//! Interactive shell
//!
//! One shell is one browsing session: a single client, cookie jar and token
//! store live for as long as the loop runs.

use super::{address, auth};
use crate::output;
use addrbook_client::{ApiClient, Navigation, SessionMonitor};
use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::{theme::ColorfulTheme, Input};

#[derive(Parser, Debug)]
#[command(name = "addrbook", no_binary_name = true, disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    command: ShellCommand,
}

/// Commands accepted at the shell prompt
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Create an account
    Register,
    /// Sign in
    Login,
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List your addresses
    #[command(alias = "ls")]
    List,
    /// Add an address
    Add,
    /// Edit an address
    Update {
        /// Address id as shown by `list`
        id: i64,
    },
    /// Delete an address
    #[command(alias = "rm")]
    Delete {
        /// Address id as shown by `list`
        id: i64,
    },
    /// Check the session again
    Status,
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, clap::Error> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(None);
    }
    Line::try_parse_from(words).map(|line| Some(line.command))
}

/// State shared by all shell commands
pub struct Session {
    pub client: ApiClient,
    pub monitor: SessionMonitor,
    pub theme: ColorfulTheme,
    view: Navigation,
}

impl Session {
    fn new(client: ApiClient) -> Self {
        Self {
            monitor: SessionMonitor::new(client.clone()),
            client,
            theme: ColorfulTheme::default(),
            view: Navigation::Loading,
        }
    }

    fn prompt(&self) -> String {
        let view = match self.view {
            Navigation::Loading => "loading",
            Navigation::Home => "home",
            Navigation::Login => "login",
        };
        format!("addrbook [{}]", view)
    }

    /// Switch views, rendering the new one.
    pub async fn navigate(&mut self, view: Navigation) {
        self.view = view;
        match view {
            Navigation::Home => address::list(self).await,
            Navigation::Login => {
                output::hint("Log in with `login`, or create an account with `register`.")
            }
            Navigation::Loading => println!("{}", style("Loading...").dim()),
        }
    }

    async fn check_session(&mut self) {
        self.navigate(Navigation::Loading).await;
        let state = self.monitor.check().await;
        tracing::debug!(%state, "session checked");
        self.navigate(state.into()).await;
    }

    async fn run(&mut self, command: ShellCommand) -> Result<()> {
        match command {
            ShellCommand::Register => auth::register(self).await?,
            ShellCommand::Login => auth::login(self).await?,
            ShellCommand::Logout => auth::logout(self).await,
            ShellCommand::Whoami => auth::whoami(self).await,
            ShellCommand::List => address::list(self).await,
            ShellCommand::Add => address::add(self).await?,
            ShellCommand::Update { id } => address::update(self, id).await?,
            ShellCommand::Delete { id } => address::delete(self, id).await?,
            ShellCommand::Status => self.check_session().await,
            ShellCommand::Quit => {}
        }
        Ok(())
    }
}

/// Run the interactive shell until `quit` or end of input
pub async fn shell(client: ApiClient) -> Result<()> {
    println!(
        "{} {}",
        style("addrbook").bold(),
        style(&client.config().base_url).dim()
    );
    output::hint("Type `help` for commands.");

    let mut session = Session::new(client);
    session.check_session().await;

    loop {
        let line: String = match Input::with_theme(&session.theme)
            .with_prompt(session.prompt())
            .allow_empty(true)
            .interact_text()
        {
            Ok(line) => line,
            Err(e) => {
                tracing::debug!(error = %e, "input closed");
                break;
            }
        };

        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                let _ = e.print();
                continue;
            }
        };
        if command == ShellCommand::Quit {
            break;
        }

        if let Err(e) = session.run(command).await {
            output::error(&format!("{:#}", e));
        }
    }

    output::hint("Bye.");
    Ok(())
}
