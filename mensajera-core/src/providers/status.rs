// File: mensajera-core/src/providers/status.rs

use mensajera_common::models::{EstadoMensaje, Proveedor};

/// Twilio message-resource statuses, both the synchronous accept values and
/// the later webhook ones.
const TWILIO_STATUS: &[(&str, EstadoMensaje)] = &[
    ("queued", EstadoMensaje::Pending),
    ("accepted", EstadoMensaje::Pending),
    ("scheduled", EstadoMensaje::Pending),
    ("sending", EstadoMensaje::Sent),
    ("sent", EstadoMensaje::Sent),
    ("delivered", EstadoMensaje::Delivered),
    ("read", EstadoMensaje::Read),
    ("undelivered", EstadoMensaje::Failed),
    ("failed", EstadoMensaje::Failed),
];

/// WhatsApp Business Cloud statuses.
const WHATSAPP_STATUS: &[(&str, EstadoMensaje)] = &[
    ("accepted", EstadoMensaje::Pending),
    ("sent", EstadoMensaje::Sent),
    ("delivered", EstadoMensaje::Delivered),
    ("read", EstadoMensaje::Read),
    ("failed", EstadoMensaje::Failed),
];

fn tabla(proveedor: Proveedor) -> &'static [(&'static str, EstadoMensaje)] {
    match proveedor {
        Proveedor::Twilio => TWILIO_STATUS,
        Proveedor::WhatsappBusiness => WHATSAPP_STATUS,
    }
}

/// Translate a provider status string into the canonical state.
///
/// Case-insensitive. Unknown or absent values map to PENDING, never FAILED:
/// the provider already accepted the message, so an unrecognized status must
/// not mask it as lost. Adding a provider means adding a table above, not
/// branching here.
pub fn map_estado(proveedor: Proveedor, raw: Option<&str>) -> EstadoMensaje {
    let raw = match raw {
        Some(s) if !s.trim().is_empty() => s.trim(),
        _ => return EstadoMensaje::Pending,
    };

    tabla(proveedor)
        .iter()
        .find(|(nombre, _)| nombre.eq_ignore_ascii_case(raw))
        .map(|(_, estado)| *estado)
        .unwrap_or(EstadoMensaje::Pending)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twilio_known_statuses() {
        assert_eq!(map_estado(Proveedor::Twilio, Some("queued")), EstadoMensaje::Pending);
        assert_eq!(map_estado(Proveedor::Twilio, Some("sending")), EstadoMensaje::Sent);
        assert_eq!(map_estado(Proveedor::Twilio, Some("sent")), EstadoMensaje::Sent);
        assert_eq!(
            map_estado(Proveedor::Twilio, Some("delivered")),
            EstadoMensaje::Delivered
        );
        assert_eq!(map_estado(Proveedor::Twilio, Some("read")), EstadoMensaje::Read);
        assert_eq!(
            map_estado(Proveedor::Twilio, Some("undelivered")),
            EstadoMensaje::Failed
        );
        assert_eq!(map_estado(Proveedor::Twilio, Some("failed")), EstadoMensaje::Failed);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(
            map_estado(Proveedor::Twilio, Some("DELIVERED")),
            EstadoMensaje::Delivered
        );
        assert_eq!(
            map_estado(Proveedor::WhatsappBusiness, Some("Read")),
            EstadoMensaje::Read
        );
    }

    #[test]
    fn unknown_or_absent_maps_to_pending_never_failed() {
        assert_eq!(
            map_estado(Proveedor::Twilio, Some("some-new-status")),
            EstadoMensaje::Pending
        );
        assert_eq!(map_estado(Proveedor::Twilio, Some("")), EstadoMensaje::Pending);
        assert_eq!(map_estado(Proveedor::WhatsappBusiness, None), EstadoMensaje::Pending);
    }
}
