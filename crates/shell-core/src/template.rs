//! Plantillas de argumentos.
//!
//! Sustitución mínima de una sola pasada: `{nombre}` se reemplaza por el
//! valor enlazado, `{{` y `}}` son llaves literales. Cada argumento admite
//! como máximo un placeholder. Los tokens de redirección `<` y `>` sin
//! escapar se rechazan antes de sustituir nada.

use indexmap::IndexMap;

use crate::errors::ShellJobError;
use crate::job::ArgumentTemplate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Placeholder(String),
}

/// Un argumento ya tokenizado y partido en segmentos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArgument {
    segments: Vec<Segment>,
}

fn invalid(argument: &str, reason: &str) -> ShellJobError {
    ShellJobError::InvalidTemplate { argument: argument.to_string(),
                                     reason: reason.to_string() }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        _ => false,
    }
}

impl ParsedArgument {
    pub fn parse(arg: &str) -> Result<Self, ShellJobError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut placeholders = 0usize;
        let mut chars = arg.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for n in chars.by_ref() {
                        if n == '}' {
                            closed = true;
                            break;
                        }
                        name.push(n);
                    }
                    if !closed {
                        return Err(invalid(arg, "unclosed `{`"));
                    }
                    if name.is_empty() {
                        return Err(invalid(arg, "empty placeholder `{}`"));
                    }
                    if !is_identifier(&name) {
                        return Err(invalid(arg, &format!("`{{{name}}}` is not a valid placeholder name")));
                    }
                    placeholders += 1;
                    if placeholders > 1 {
                        return Err(ShellJobError::MultiplePlaceholders(arg.to_string()));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(name));
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(invalid(arg, "unmatched `}`")),
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    /// Nombre del placeholder del argumento, si tiene uno.
    pub fn placeholder(&self) -> Option<&str> {
        self.segments.iter().find_map(|s| match s {
                                Segment::Placeholder(name) => Some(name.as_str()),
                                Segment::Literal(_) => None,
                            })
    }

    pub fn render(&self, bindings: &IndexMap<String, String>) -> Result<String, ShellJobError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    let value = bindings.get(name)
                                        .ok_or_else(|| ShellJobError::UnknownPlaceholder(name.clone()))?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

fn redirect_error(c: char) -> ShellJobError {
    if c == '<' {
        ShellJobError::StdinRedirect
    } else {
        ShellJobError::StdoutRedirect
    }
}

/// Cada token es un elemento de argv: sólo `<`/`>` sueltos redirigirían en
/// un shell. `\<` y `\>` sueltos quedan como literales.
fn unescape_token(token: &str) -> Result<String, ShellJobError> {
    match token {
        "<" => Err(ShellJobError::StdinRedirect),
        ">" => Err(ShellJobError::StdoutRedirect),
        r"\<" => Ok("<".to_string()),
        r"\>" => Ok(">".to_string()),
        other => Ok(other.to_string()),
    }
}

/// Busca `<`/`>` fuera de comillas y sin barra invertida en un template crudo.
fn check_raw_redirects(raw: &str) -> Result<(), ShellJobError> {
    let mut single = false;
    let mut double = false;
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' if !single => {
                chars.next();
            }
            '\'' if !double => single = !single,
            '"' if !single => double = !double,
            '<' | '>' if !single && !double => return Err(redirect_error(c)),
            _ => {}
        }
    }
    Ok(())
}

/// Convierte el template en la lista de tokens previa a la sustitución.
pub fn tokenize(template: &ArgumentTemplate) -> Result<Vec<String>, ShellJobError> {
    match template {
        ArgumentTemplate::Tokens(tokens) => tokens.iter().map(|t| unescape_token(t)).collect(),
        ArgumentTemplate::Raw(raw) => {
            check_raw_redirects(raw)?;
            shlex::split(raw).ok_or_else(|| invalid(raw, "unbalanced quotes or trailing escape"))
        }
    }
}

pub fn parse_template(template: &ArgumentTemplate) -> Result<Vec<ParsedArgument>, ShellJobError> {
    tokenize(template)?.iter().map(|t| ParsedArgument::parse(t)).collect()
}

/// Nombres de placeholder referenciados, en orden de aparición y sin repetir.
pub fn placeholders(template: &ArgumentTemplate) -> Result<Vec<String>, ShellJobError> {
    let mut names: Vec<String> = Vec::new();
    for arg in parse_template(template)? {
        if let Some(name) = arg.placeholder() {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}

/// Expande el template con `bindings`. Un placeholder sin valor es un error.
pub fn expand(template: &ArgumentTemplate, bindings: &IndexMap<String, String>) -> Result<Vec<String>, ShellJobError> {
    parse_template(template)?.iter().map(|arg| arg.render(bindings)).collect()
}
