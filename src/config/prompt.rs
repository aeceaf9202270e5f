use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use log::info;
use thiserror::Error;

/// Persona instructions compiled into the binary.
pub const DEFAULT_PERSONA: &str = include_str!("../../prompts/steiner.md");

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Failed to read persona file '{0}': {1}")]
    IoError(String, #[source] std::io::Error),
    #[error("Persona file '{0}' is empty")]
    EmptyPersona(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonaSource {
    BuiltIn,
    File(String),
}

impl fmt::Display for PersonaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersonaSource::BuiltIn => write!(f, "built-in"),
            PersonaSource::File(path) => write!(f, "file {}", path),
        }
    }
}

/// The fixed system instruction block prepended to every completion request.
/// Loaded once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct PersonaPrompt {
    text: Arc<str>,
    source: PersonaSource,
}

impl PersonaPrompt {
    pub fn new(text: impl Into<Arc<str>>, source: PersonaSource) -> Self {
        Self { text: text.into(), source }
    }

    pub fn built_in() -> Self {
        Self::new(DEFAULT_PERSONA.trim(), PersonaSource::BuiltIn)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source(&self) -> &PersonaSource {
        &self.source
    }
}

pub fn load_persona_file<P: AsRef<Path>>(path: P) -> Result<PersonaPrompt, PromptError> {
    let display = path.as_ref().display().to_string();
    let content = fs
        ::read_to_string(&path)
        .map_err(|e| PromptError::IoError(display.clone(), e))?;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(PromptError::EmptyPersona(display));
    }
    Ok(PersonaPrompt::new(trimmed, PersonaSource::File(display)))
}

/// Uses the file at `path` when one is configured, otherwise the built-in persona.
pub fn load_persona(path: Option<&str>) -> Result<PersonaPrompt, PromptError> {
    let persona = match path {
        Some(p) if !p.trim().is_empty() => load_persona_file(p)?,
        _ => PersonaPrompt::built_in(),
    };
    info!("Persona loaded from {} ({} chars)", persona.source(), persona.text().chars().count());
    Ok(persona)
}
