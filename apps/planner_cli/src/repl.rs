//! Line commands standing in for the form's buttons and keys.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Bare Enter on the last row.
    Enter,
    /// Plain text replaces the last row.
    SetLast(String),
    /// Rows are numbered from 1 on screen and from 0 here.
    Edit { index: usize, value: String },
    Add,
    Remove(usize),
    Submit,
    Show,
    Help,
    Quit,
    Unknown(String),
}

pub const HELP: &str = "\
texto          escribe la dirección en la última fila
<Enter>        envía si la última fila es válida, si no agrega una fila
:add           agrega una fila vacía
:edit N texto  reemplaza la fila N
:rm N          elimina la fila N
:send          envía la ruta
:show          muestra las filas
:quit          salir";

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        if line.trim().is_empty() {
            return Self::Enter;
        }

        let Some(command) = line.strip_prefix(':') else {
            return Self::SetLast(line.to_string());
        };

        let (name, rest) = command
            .split_once(char::is_whitespace)
            .map(|(name, rest)| (name, rest.trim()))
            .unwrap_or((command.trim(), ""));

        match name {
            "add" | "a" => Self::Add,
            "send" | "s" => Self::Submit,
            "show" | "ls" => Self::Show,
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" => Self::Quit,
            "rm" => match parse_row(rest) {
                Some(index) => Self::Remove(index),
                None => Self::Unknown(line.to_string()),
            },
            "edit" | "e" => {
                let (row, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                match parse_row(row) {
                    Some(index) => Self::Edit {
                        index,
                        value: value.trim_start().to_string(),
                    },
                    None => Self::Unknown(line.to_string()),
                }
            }
            _ => Self::Unknown(line.to_string()),
        }
    }
}

fn parse_row(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok()?.checked_sub(1)
}
