//! Text shown in the transcript and text sent to the model. Both are derived
//! from the same rows but are never the same string.

use shared::domain::AddressEntry;

pub const WELCOME_MESSAGE: &str = "Bienvenido a la aplicación de optimización de rutas. Ingresa tus direcciones y te ayudaré a encontrar la ruta óptima.";

pub const VALIDATION_FAILED_MESSAGE: &str =
    "Por favor, corrige los campos con errores antes de enviar.";

pub const SERVICE_UNAVAILABLE_MESSAGE: &str =
    "En este momento no se puede obtener ayuda. Por favor, intenta más tarde.";

const USER_MESSAGE_PREFIX: &str = "Necesito optimizar esta ruta: ";
const PROMPT_PREFIX: &str = "Dada la siguiente lista de destinos: ";
const PROMPT_INSTRUCTION: &str = "Indica la ruta óptima para llegar a todos los destinos de manera eficiente, organizando el orden de visita de forma sencilla y sin introducciones innecesarias.";

fn bulleted(entries: &[AddressEntry], marker: &str) -> String {
    entries
        .iter()
        .map(|entry| format!("{marker} {}", entry.value))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn user_message_text(entries: &[AddressEntry]) -> String {
    format!("{USER_MESSAGE_PREFIX}{}", bulleted(entries, "-"))
}

pub fn completion_prompt(entries: &[AddressEntry]) -> String {
    format!("{PROMPT_PREFIX}{} {PROMPT_INSTRUCTION}", bulleted(entries, "–"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(values: &[&str]) -> Vec<AddressEntry> {
        values
            .iter()
            .map(|value| AddressEntry {
                value: value.to_string(),
                is_invalid: false,
            })
            .collect()
    }

    #[test]
    fn user_message_bullets_each_entry_in_order() {
        let text = user_message_text(&entries(&["Main St 5", "Oak Ave 12"]));
        assert_eq!(text, "Necesito optimizar esta ruta: - Main St 5 - Oak Ave 12");
    }

    #[test]
    fn prompt_embeds_entries_and_instruction() {
        let prompt = completion_prompt(&entries(&["Main St 5", "Oak Ave 12"]));
        assert!(prompt
            .starts_with("Dada la siguiente lista de destinos: – Main St 5 – Oak Ave 12 "));
        assert!(prompt.ends_with("sin introducciones innecesarias."));
    }

    #[test]
    fn prompt_differs_from_user_message() {
        let rows = entries(&["Main St 5"]);
        assert_ne!(user_message_text(&rows), completion_prompt(&rows));
    }
}
