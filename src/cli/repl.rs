// Interactive terminal chat against a running tutor server

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use super::commands::{handle_command, Command};
use crate::client::{BubbleKind, ChatPanel, SubmitRejected, TutorClient};

pub struct Repl {
    client: TutorClient,
    panel: ChatPanel,
}

impl Repl {
    pub fn new(client: TutorClient, subject: &str, unit: &str) -> Self {
        Self {
            client,
            panel: ChatPanel::new(subject, unit),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new()?;

        println!("Personal Tutor - {}", self.client.base_url());
        self.print_last();
        println!("Type /help for commands.");

        loop {
            let line = match editor.readline("質問> ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            };

            if let Some(command) = Command::parse(&line) {
                println!("{}", handle_command(command, &self.panel));
                if command == Command::Quit {
                    break;
                }
                continue;
            }

            let _ = editor.add_history_entry(line.as_str());

            // The prompt is not re-shown until submit returns, so the
            // terminal cannot send a second question while one is pending.
            match self.panel.submit(&self.client, &line).await {
                Ok(()) => self.print_last(),
                Err(SubmitRejected::EmptyQuestion) => continue,
                Err(e) => eprintln!("{e}"),
            }
        }

        Ok(())
    }

    fn print_last(&self) {
        if let Some(bubble) = self.panel.bubbles().last() {
            let prefix = match bubble.kind {
                BubbleKind::Assistant => "先生",
                BubbleKind::User => "あなた",
                BubbleKind::System => "*",
            };
            println!("{prefix}: {}\n", bubble.text);
        }
    }
}
