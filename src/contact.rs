use crate::models::{ContactFields, ContactSubmission};

/// Subject used when the visitor leaves the field blank.
pub const DEFAULT_SUBJECT: &str = "Contacto desde la web";

/// Trim and validate the submitted fields. `nombre`, `email` and `mensaje`
/// are required; `asunto` falls back to the default subject. `None` means
/// the submission must be rejected without contacting the webhook.
pub fn validate(fields: &ContactFields) -> Option<ContactSubmission> {
    let nombre = fields.nombre.trim();
    let email = fields.email.trim();
    let asunto = fields.asunto.trim();
    let mensaje = fields.mensaje.trim();

    if nombre.is_empty() || email.is_empty() || mensaje.is_empty() {
        return None;
    }

    Some(ContactSubmission {
        nombre: nombre.to_owned(),
        email: email.to_owned(),
        asunto: if asunto.is_empty() {
            DEFAULT_SUBJECT.to_owned()
        } else {
            asunto.to_owned()
        },
        mensaje: mensaje.to_owned(),
    })
}
