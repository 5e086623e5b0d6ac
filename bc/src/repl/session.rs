//! Chat REPL session

use std::io::{self, Write};
use std::path::PathBuf;

use chrono::Local;
use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::conversation::ConversationEngine;
use crate::domain::{Message, Role, Stage};
use crate::error::ConsultError;
use crate::report::{ReportManager, export};

/// Interactive consultation session
pub struct ChatSession {
    engine: ConversationEngine,
    reports: ReportManager,
    export_dir: PathBuf,
}

impl ChatSession {
    pub fn new(engine: ConversationEngine, reports: ReportManager, export_dir: PathBuf) -> Self {
        Self {
            engine,
            reports,
            export_dir,
        }
    }

    /// Run the REPL main loop
    pub async fn run(&mut self) -> Result<()> {
        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        self.print_welcome();

        if self.engine.resume_pending() {
            self.ask_resume(&mut rl)?;
        } else {
            self.print_latest();
        }

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(input);

                    if input.starts_with('/') {
                        match self.handle_slash_command(input).await {
                            SlashResult::Continue => continue,
                            SlashResult::Quit => break,
                        }
                    } else {
                        self.process_user_input(input).await;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("再见！");
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "一人公司商业顾问".bright_cyan().bold());
        if let Some(project) = self.engine.project() {
            println!("Project: {}", project);
        }
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }

    /// Resume-or-restart decision for a restored conversation
    fn ask_resume(&mut self, rl: &mut DefaultEditor) -> Result<()> {
        let state = self.engine.state();
        println!(
            "{} ({} answers, stage: {})",
            "发现未完成的对话".yellow(),
            state.user_turns(),
            state.stage
        );

        let answer = match rl.readline("继续上次的对话？[Y/n] ") {
            Ok(answer) => answer,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => String::new(),
            Err(err) => return Err(eyre::eyre!("Readline error: {}", err)),
        };

        if matches!(answer.trim().to_lowercase().as_str(), "n" | "no" | "否") {
            debug!("ask_resume: restarting");
            self.engine.reset();
            println!("{}", "已开始新的对话。".dimmed());
        } else {
            debug!("ask_resume: resuming");
            self.engine.resume();
        }
        self.print_latest();
        Ok(())
    }

    /// Print the last assistant message so the user knows where things stand
    fn print_latest(&self) {
        if let Some(msg) = self.engine.state().messages.iter().rev().find(|m| !m.is_user()) {
            print_message(msg);
        }
    }

    async fn handle_slash_command(&mut self, input: &str) -> SlashResult {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let cmd = parts.first().copied().unwrap_or("");

        match cmd {
            "/help" | "/h" => {
                self.print_help();
                SlashResult::Continue
            }
            "/quit" | "/q" | "/exit" => SlashResult::Quit,
            "/new" => {
                self.engine.reset();
                println!("{}", "已开始新的对话。".dimmed());
                self.print_latest();
                SlashResult::Continue
            }
            "/history" => {
                self.print_history();
                SlashResult::Continue
            }
            "/save" => {
                self.save_report().await;
                SlashResult::Continue
            }
            "/export" => {
                self.export();
                SlashResult::Continue
            }
            _ => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
                SlashResult::Continue
            }
        }
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:14} Show this help", "/help".yellow());
        println!("  {:14} Exit the chat (the conversation is kept)", "/quit".yellow());
        println!("  {:14} Start a new conversation", "/new".yellow());
        println!("  {:14} Show conversation history", "/history".yellow());
        println!("  {:14} Save the recommendations as a report", "/save".yellow());
        println!("  {:14} Export the conversation as a text file", "/export".yellow());
        println!();
    }

    fn print_history(&self) {
        let messages = &self.engine.state().messages;
        println!();
        println!("{}", "Conversation History:".bright_cyan());
        for (i, msg) in messages.iter().enumerate() {
            let role = match msg.role {
                Role::User => "用户".bright_green(),
                Role::Assistant => "顾问".bright_blue(),
            };
            let preview: String = msg.content.chars().take(50).collect();
            let preview = if msg.content.chars().count() > 50 {
                format!("{}...", preview)
            } else {
                preview
            };
            println!("  {}. {}: {}", i + 1, role, preview.replace('\n', " "));
        }
        println!();
    }

    async fn process_user_input(&mut self, input: &str) {
        print!("{}", "顾问思考中...".dimmed());
        let _ = io::stdout().flush();

        let result = self.engine.submit(input).await;
        println!();

        match result {
            Ok(reply) => {
                print_message(&reply);
                if self.engine.stage() == Stage::Recommending {
                    println!(
                        "{}",
                        "方案已生成。输入 /save 保存为报告，/export 导出文本。".dimmed()
                    );
                }
            }
            Err(e) => print_error(&e),
        }
    }

    async fn save_report(&self) {
        match self.engine.save_report(&self.reports).await {
            Ok(report) => {
                println!("{} {}", "报告已保存:".bright_green(), report.report_id);
                println!("Run {} to publish its items.", format!("bizc report show {}", report.report_id).yellow());
            }
            Err(e) => print_error(&e),
        }
    }

    fn export(&self) {
        let state = self.engine.state();
        let content = export::render_txt(
            &state.messages,
            &state.business_goal,
            state.recommendations.as_ref(),
            Local::now(),
        );
        match export::write_txt(&self.export_dir, &content) {
            Ok(path) => println!("{} {}", "已导出:".bright_green(), path.display()),
            Err(e) => println!("{} {:#}", "Error:".red(), e),
        }
    }
}

fn print_message(msg: &Message) {
    println!();
    println!("{}", "顾问:".bright_blue().bold());
    println!("{}", msg.content);
    println!();
}

fn print_error(err: &ConsultError) {
    println!("{} {}", "Error:".red(), err);
    if err.requires_login() {
        println!("Run {} and try again.", "bizc login --token <TOKEN>".yellow());
    }
}

/// Result of handling a slash command
enum SlashResult {
    Continue,
    Quit,
}
