use rustyline::{
    Config as RustyConfig, Editor, error::ReadlineError,
    completion::{Completer, Pair},
    hint::{Hinter, HistoryHinter},
    highlight::{Highlighter, MatchingBracketHighlighter, CmdKind},
    validate::Validator,
    Helper, history::FileHistory
};
use colored::Colorize;
use crate::{
    error::{Error, UNAVAILABLE_NOTICE},
    message::{Message, Role},
    session::ChatSession,
};

const COMMANDS: [&str; 4] = ["/help", "/history", "/reset", "/exit"];

struct FinwiseHelper {
    hinter: HistoryHinter,
    bracket_highlighter: MatchingBracketHighlighter,
}

impl Helper for FinwiseHelper {}

/// Slash commands matching what has been typed so far. Only the first word
/// of a line is ever a command.
fn command_candidates(before_cursor: &str) -> Vec<&'static str> {
    if !before_cursor.starts_with('/') || before_cursor.contains(char::is_whitespace) {
        return Vec::new();
    }
    COMMANDS.iter().copied().filter(|cmd| cmd.starts_with(before_cursor)).collect()
}

impl Completer for FinwiseHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let candidates = command_candidates(&line[..pos])
            .into_iter()
            .map(|cmd| Pair { display: cmd.to_string(), replacement: cmd.to_string() })
            .collect();
        Ok((0, candidates))
    }
}

impl Hinter for FinwiseHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &rustyline::Context<'_>) -> Option<String> {
        self.hinter.hint(line, pos, ctx)
    }
}

impl Highlighter for FinwiseHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> std::borrow::Cow<'h, str> {
        std::borrow::Cow::Owned(hint.truecolor(128, 128, 128).to_string())
    }

    fn highlight<'l>(&self, line: &'l str, pos: usize) -> std::borrow::Cow<'l, str> {
        self.bracket_highlighter.highlight(line, pos)
    }

    fn highlight_char(&self, line: &str, pos: usize, forced: CmdKind) -> bool {
        self.bracket_highlighter.highlight_char(line, pos, forced)
    }
}

impl Validator for FinwiseHelper {}

pub fn print_banner() {
    println!("{}", "💹 FinWise – Your AI Financial Advisor".green().bold());
    println!(
        "{}",
        "Personalized financial guidance for India – Investments, Tax, and Wealth Planning".green()
    );
    println!(
        "{}\n",
        format!("v{} · type /help for commands", env!("CARGO_PKG_VERSION")).truecolor(128, 128, 128)
    );
}

fn avatar(role: Role) -> &'static str {
    match role {
        Role::User => "🧑‍💼",
        Role::Assistant => "💹",
    }
}

fn render(message: &Message) {
    let label = match message.role() {
        Role::User => "You",
        Role::Assistant => "FinWise",
    };
    println!("{} {}", avatar(message.role()), label.cyan().bold());
    match message.role() {
        Role::User => println!("{}\n", message.text().white()),
        Role::Assistant => println!("{}\n", message.text().yellow()),
    }
}

fn replay(history: &[Message]) {
    if history.is_empty() {
        println!("{}", "No conversation history yet.".truecolor(128, 128, 128));
        return;
    }
    println!("{}", format!("--- Conversation ({} messages) ---", history.len()).yellow());
    history.iter().for_each(render);
    println!("{}", "--- End of Conversation ---".yellow());
}

fn ask(session: &mut ChatSession, input: &str) {
    println!("{}", "Thinking...".truecolor(128, 128, 128));
    match session.send(input) {
        Ok(reply) => render(reply),
        Err(Error::UpstreamUnavailable(_)) => println!("{}\n", format!("⚠️  {}", UNAVAILABLE_NOTICE).red()),
        Err(e) => println!("{}", e.to_string().red()),
    }
}

pub fn run_cli(mut session: ChatSession) -> Result<(), Error> {
    let rusty_config = RustyConfig::builder()
        .completion_type(rustyline::CompletionType::List)
        .build();

    let mut rl: Editor<FinwiseHelper, FileHistory> = Editor::with_config(rusty_config)?;
    rl.set_helper(Some(FinwiseHelper {
        hinter: HistoryHinter {},
        bracket_highlighter: MatchingBracketHighlighter::new(),
    }));

    loop {
        match rl.readline(&"finwise> ".green()) {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                rl.add_history_entry(input)?;
                match input {
                    "/exit" | "exit" | "quit" => break,
                    "/help" => println!(
                        "{}",
                        "Ask about investments, taxes, or financial planning.\n\
                        \n\
                        Available commands:\n\
                        - /history: Show the conversation so far\n\
                        - /reset: Start a new conversation\n\
                        - /exit: Exit the program\n\
                        - /help: Show this help message\n"
                            .blue()
                    ),
                    "/history" => {
                        replay(session.history());
                        if session.last_turn_failed() {
                            println!(
                                "{}",
                                "Your last message was not answered and is not part of the conversation."
                                    .truecolor(128, 128, 128)
                            );
                        }
                    }
                    "/reset" => match session.reset() {
                        Ok(()) => println!("{}", "Chat history cleared.".yellow()),
                        Err(e) => println!("{}", e.to_string().red()),
                    },
                    cmd if cmd.starts_with('/') => println!(
                        "{}",
                        format!("Unknown command '{}'. Type /help for the list.", cmd).red()
                    ),
                    _ => ask(&mut session, input),
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    println!("{}", "Goodbye!".blue());
    Ok(())
}
