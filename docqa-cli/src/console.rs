//! Interactive question answering over the console.
//!
//! [`ChatSession`] owns the read-eval-print loop. Input comes from a
//! [`LineReader`] (rustyline in production, [`ScriptedReader`] in tests) and
//! questions go to an [`Answerer`].

use std::collections::VecDeque;
use std::io::Write;
use std::sync::Arc;

use anyhow::bail;
use async_trait::async_trait;
use docqa_model::ChatModel;
use docqa_rag::Retriever;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, info};

pub const PROMPT: &str = "Pergunta: ";
pub const BANNER: &str = "🤖 Busca utilizando RAG";
pub const INSTRUCTIONS: &str = "Instruções:
• Faça sua pergunta e pressione Enter
• Digite 'sair', 'quit' ou 'exit' para encerrar o chat
• Digite 'limpar' para limpar a tela
• Digite 'ajuda' para ver os comandos";
pub const HELP: &str = "Comandos disponíveis:

sair/quit/exit - Encerra o chat
limpar - Limpa a tela
ajuda - Mostra esta ajuda";
pub const EXIT_QUESTION: &str = "Tem certeza que deseja sair?";
pub const INTERRUPT_QUESTION: &str = "Deseja realmente sair?";
pub const INTERRUPTED: &str = "Interrompido pelo usuário.";
pub const EMPTY_HINT: &str = "Por favor, digite uma mensagem.";
pub const SEARCHING: &str = "buscando resposta...";
pub const ANSWER_HEADER: &str = "Resposta:";
pub const FAREWELL: &str = "👋 Até logo!";

const EXIT_KEYWORDS: [&str; 3] = ["sair", "quit", "exit"];
const CLEAR_KEYWORD: &str = "limpar";
const HELP_KEYWORD: &str = "ajuda";

/// One read from the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadLine {
    Line(String),
    /// Ctrl-C at the prompt.
    Interrupted,
    /// Ctrl-D, or the input stream ended.
    Eof,
}

pub trait LineReader {
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<ReadLine>;

    fn clear_screen(&mut self) -> anyhow::Result<()>;
}

/// Terminal line editor with in-memory history.
pub struct RustylineReader {
    editor: DefaultEditor,
}

impl RustylineReader {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self { editor: DefaultEditor::new()? })
    }
}

impl LineReader for RustylineReader {
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<ReadLine> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = self.editor.add_history_entry(line.as_str()) {
                        debug!(error = %e, "history entry not recorded");
                    }
                }
                Ok(ReadLine::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadLine::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadLine::Eof),
            Err(e) => Err(e.into()),
        }
    }

    fn clear_screen(&mut self) -> anyhow::Result<()> {
        self.editor.clear_screen()?;
        Ok(())
    }
}

/// Replays a fixed script of reads. Once the script runs out every read is
/// [`ReadLine::Eof`].
#[derive(Debug, Default)]
pub struct ScriptedReader {
    script: VecDeque<ReadLine>,
    prompts: Vec<String>,
    clears: usize,
}

impl ScriptedReader {
    pub fn new(script: impl IntoIterator<Item = ReadLine>) -> Self {
        Self { script: script.into_iter().collect(), ..Self::default() }
    }

    /// Script of plain lines.
    pub fn lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(lines.into_iter().map(|l| ReadLine::Line(l.to_string())))
    }

    /// Every prompt shown so far, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn clears(&self) -> usize {
        self.clears
    }

    /// Reads not consumed yet.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl LineReader for ScriptedReader {
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<ReadLine> {
        self.prompts.push(prompt.to_string());
        Ok(self.script.pop_front().unwrap_or(ReadLine::Eof))
    }

    fn clear_screen(&mut self) -> anyhow::Result<()> {
        self.clears += 1;
        Ok(())
    }
}

/// Turns a question into answer text.
#[async_trait]
pub trait Answerer: Send + Sync {
    async fn answer(&self, question: &str) -> anyhow::Result<String>;
}

/// Retrieves context for the question and asks a chat model.
pub struct RagAnswerer {
    retriever: Retriever,
    model: Arc<dyn ChatModel>,
    temperature: f32,
}

impl RagAnswerer {
    pub const TEMPERATURE: f32 = 0.5;

    pub fn new(retriever: Retriever, model: Arc<dyn ChatModel>) -> Self {
        Self { retriever, model, temperature: Self::TEMPERATURE }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl Answerer for RagAnswerer {
    async fn answer(&self, question: &str) -> anyhow::Result<String> {
        let prompt = self.retriever.search_prompt(Some(question)).await?;
        let Some(prompt) = prompt.rendered() else {
            bail!("no prompt can be built for an empty question");
        };
        debug!(model = self.model.name(), prompt_len = prompt.len(), "invoking chat model");
        Ok(self.model.invoke(prompt, self.temperature).await?)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Exit,
    Clear,
    Help,
    Empty,
    Question(&'a str),
}

impl<'a> Command<'a> {
    fn parse(input: &'a str) -> Self {
        let trimmed = input.trim();
        let lowered = trimmed.to_lowercase();
        if EXIT_KEYWORDS.contains(&lowered.as_str()) {
            Command::Exit
        } else if lowered == CLEAR_KEYWORD {
            Command::Clear
        } else if lowered == HELP_KEYWORD {
            Command::Help
        } else if trimmed.is_empty() {
            Command::Empty
        } else {
            Command::Question(trimmed)
        }
    }
}

fn parse_confirmation(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" | "s" | "sim" => Some(true),
        "n" | "no" | "nao" | "não" => Some(false),
        _ => None,
    }
}

/// The chat loop. Errors from the answerer end the session and are returned
/// unchanged.
pub struct ChatSession<R, A, W> {
    reader: R,
    answerer: A,
    out: W,
}

impl<R: LineReader, A: Answerer, W: Write> ChatSession<R, A, W> {
    pub fn new(reader: R, answerer: A, out: W) -> Self {
        Self { reader, answerer, out }
    }

    pub fn into_parts(self) -> (R, A, W) {
        (self.reader, self.answerer, self.out)
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        writeln!(self.out, "\n\n{BANNER}\n\n{INSTRUCTIONS}\n")?;

        loop {
            match self.reader.read_line(PROMPT)? {
                ReadLine::Eof => return self.farewell(),
                ReadLine::Interrupted => {
                    writeln!(self.out, "\n{INTERRUPTED}")?;
                    if self.confirm(INTERRUPT_QUESTION)? {
                        return self.farewell();
                    }
                }
                ReadLine::Line(line) => match Command::parse(&line) {
                    Command::Exit => {
                        if self.confirm(EXIT_QUESTION)? {
                            return self.farewell();
                        }
                    }
                    Command::Clear => self.reader.clear_screen()?,
                    Command::Help => writeln!(self.out, "\n{HELP}\n")?,
                    Command::Empty => writeln!(self.out, "{EMPTY_HINT}")?,
                    Command::Question(question) => {
                        writeln!(self.out, "{SEARCHING}")?;
                        self.out.flush()?;
                        info!(question_len = question.len(), "answering question");
                        let answer = self.answerer.answer(question).await?;
                        writeln!(self.out, "\n{ANSWER_HEADER}\n{answer}\n")?;
                    }
                },
            }
        }
    }

    /// Ask a yes/no question until it gets an answer. Interrupt or end of
    /// input while asking counts as yes.
    fn confirm(&mut self, question: &str) -> anyhow::Result<bool> {
        let prompt = format!("{question} [y/n]: ");
        loop {
            match self.reader.read_line(&prompt)? {
                ReadLine::Line(answer) => match parse_confirmation(&answer) {
                    Some(confirmed) => return Ok(confirmed),
                    None => writeln!(self.out, "Por favor, responda y ou n.")?,
                },
                ReadLine::Interrupted | ReadLine::Eof => return Ok(true),
            }
        }
    }

    fn farewell(&mut self) -> anyhow::Result<()> {
        writeln!(self.out, "\n{FAREWELL}\n")?;
        self.out.flush()?;
        Ok(())
    }
}
