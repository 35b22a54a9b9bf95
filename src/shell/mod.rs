//! Interactive shell
//!
//! Numbered-menu front end over stdin/stdout. The shell only collects
//! input and renders outcomes; every behavior lives in the chat client
//! and the dispatcher.

use crate::chat::{
    ChatClient, JoinOutcome, LeaveOutcome, ReadOutcome, SendOutcome, SwitchOutcome, UserProfile,
};
use crate::clock::Clock;
use crate::commands::{CommandContext, BANNER};
use crate::dispatch::{Dispatch, Dispatcher};
use crate::store::Store;
use anyhow::Result;
use std::io::Write as _;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

const MENU: &str = "
Options:
1. Identify yourself
2. Switch user
3. Send a message to a channel
4. Read messages from subscribed channels
5. Join a channel
6. List subscribed channels
7. Leave a channel
8. Get the chat history for a user
9. Get the list of identified users
10. Special commands
11. Exit";

type InputLines = Lines<BufReader<Stdin>>;

/// The interactive menu loop.
pub struct Shell<S, C> {
    client: ChatClient<S, C>,
    dispatcher: Dispatcher,
}

impl<S: Store, C: Clock> Shell<S, C> {
    pub fn new(client: ChatClient<S, C>) -> Self {
        Shell {
            client,
            dispatcher: Dispatcher::new(),
        }
    }

    /// Run until the user exits or stdin closes.
    pub async fn run(&mut self) -> Result<()> {
        println!("{}", BANNER);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            println!("{}", MENU);
            let choice = match prompt(&mut lines, "Enter the option number you want: ").await? {
                Some(choice) => choice,
                None => break,
            };

            match choice.as_str() {
                "1" => self.identify(&mut lines).await?,
                "2" => self.switch_user(&mut lines).await?,
                "3" => self.send(&mut lines).await?,
                "4" => self.read(&mut lines).await?,
                "5" => self.join(&mut lines).await?,
                "6" => self.list_subscriptions(),
                "7" => self.leave(&mut lines).await?,
                "8" => self.chat_history(&mut lines).await?,
                "9" => self.identified_users().await?,
                "10" => self.special_command(&mut lines).await?,
                "11" => break,
                _ => {}
            }
        }

        Ok(())
    }

    async fn identify(&mut self, lines: &mut InputLines) -> Result<()> {
        let Some(username) = prompt(lines, "Enter your username: ").await? else {
            return Ok(());
        };
        let Some(age) = prompt(lines, "Enter your age: ").await? else {
            return Ok(());
        };
        let Some(gender) = prompt(lines, "Enter your gender: ").await? else {
            return Ok(());
        };
        let Some(location) = prompt(lines, "Enter your location: ").await? else {
            return Ok(());
        };

        self.client
            .identify(UserProfile {
                username,
                age,
                gender,
                location,
            })
            .await?;
        println!("User identified successfully.");
        Ok(())
    }

    async fn switch_user(&mut self, lines: &mut InputLines) -> Result<()> {
        let Some(username) = prompt(lines, "Enter the username you want to switch to: ").await?
        else {
            return Ok(());
        };

        match self.client.switch_user(&username).await? {
            SwitchOutcome::UnknownUser => {
                println!(
                    "User {} not found. Please identify yourself first.",
                    username
                );
            }
            SwitchOutcome::Switched { previous } => {
                match previous {
                    Some(previous) => println!("Switching from {} to {}.", previous, username),
                    None => println!("Switching to {}.", username),
                }
                println!("User switched to {} successfully.", username);
            }
        }
        Ok(())
    }

    async fn send(&mut self, lines: &mut InputLines) -> Result<()> {
        let Some(channel) = prompt(lines, "Enter the channel name you want to send a message to: ")
            .await?
        else {
            return Ok(());
        };
        let Some(message) = prompt(lines, "Enter your message: ").await? else {
            return Ok(());
        };

        println!("Sending message to channel: {} ...", channel);
        match self.client.send(&channel, &message).await? {
            SendOutcome::Sent { anonymous: false } => {
                println!("Chat history stored successfully.");
            }
            SendOutcome::Sent { anonymous: true } => {
                println!("Sent without an identity; chat history not recorded.");
            }
        }
        Ok(())
    }

    async fn read(&mut self, lines: &mut InputLines) -> Result<()> {
        let Some(channel) =
            prompt(lines, "Enter the channel name you want to read messages from: ").await?
        else {
            return Ok(());
        };

        println!("Reading messages from channel: {} ...", channel);
        let outcome = self
            .client
            .read_channel(&channel, |event| {
                println!(
                    "[{}] {}: {}",
                    event.channel,
                    event.from.as_deref().unwrap_or("anonymous"),
                    event.message
                );
            })
            .await?;

        if outcome == ReadOutcome::NotSubscribed {
            println!(
                "Channel {} not subscribed. Please join the channel first.",
                channel
            );
        }
        Ok(())
    }

    async fn join(&mut self, lines: &mut InputLines) -> Result<()> {
        let Some(channel) = prompt(lines, "Enter the channel name you want to join: ").await?
        else {
            return Ok(());
        };

        match self.client.join(&channel).await? {
            JoinOutcome::Joined => println!("Subscribed to channel: {}", channel),
            JoinOutcome::AlreadySubscribed => {
                println!("Already subscribed to channel: {}", channel);
            }
        }
        Ok(())
    }

    fn list_subscriptions(&self) {
        println!("Subscribed channels: {}", self.client.subscriptions().join(", "));
    }

    async fn leave(&mut self, lines: &mut InputLines) -> Result<()> {
        let Some(channel) = prompt(lines, "Enter the channel name you want to leave: ").await?
        else {
            return Ok(());
        };

        match self.client.leave(&channel).await? {
            LeaveOutcome::Left => println!("Unsubscribed from channel: {}", channel),
            LeaveOutcome::NotSubscribed => println!("Not subscribed to channel: {}", channel),
        }
        Ok(())
    }

    async fn chat_history(&mut self, lines: &mut InputLines) -> Result<()> {
        let Some(username) = prompt(lines, "Enter the username to get the chat history: ").await?
        else {
            return Ok(());
        };

        let history = self.client.chat_history(&username).await?;
        if history.is_empty() {
            println!("No chat history found for {}.", username);
        } else {
            println!("Chat history for {}:", username);
            for (idx, message) in history.iter().enumerate() {
                println!("{}. {}", idx + 1, message);
            }
        }
        Ok(())
    }

    async fn identified_users(&mut self) -> Result<()> {
        let users = self.client.identified_users().await?;
        if users.is_empty() {
            println!("No identified users found.");
        } else {
            println!("Identified users:");
            for user in users {
                println!("{}", user);
            }
        }
        Ok(())
    }

    async fn special_command(&mut self, lines: &mut InputLines) -> Result<()> {
        let Some(line) = prompt(lines, "Enter your special command: ").await? else {
            return Ok(());
        };

        let (store, session) = self.client.parts();
        let mut ctx = CommandContext::new(store, session);
        match self.dispatcher.dispatch(&line, &mut ctx).await? {
            Dispatch::Replied(reply) => {
                for line in reply {
                    println!("{}", line);
                }
            }
            // Not a command: best-effort dispatch stays silent.
            Dispatch::Ignored => {}
        }
        Ok(())
    }
}

/// Print a prompt and read one trimmed line. None means stdin closed.
async fn prompt(lines: &mut InputLines, label: &str) -> Result<Option<String>> {
    print!("{}", label);
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?.map(|line| line.trim().to_string()))
}
