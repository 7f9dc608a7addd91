pub mod campaign;
pub mod credential;
pub mod conversation;
pub mod event_log;
pub mod message;
pub mod template;

pub use campaign::{Campana, DestinatariosConfig, EstadoCampana, ResumenCampana};
pub use credential::{Canal, ChannelCredential, Proveedor};
pub use conversation::Conversacion;
pub use event_log::{EventLogEntry, ResultadoEvento};
pub use message::{
    Direccion, EstadoMensaje, FalloEnvio, Mensaje, SendOutcome, TipoMensaje,
};
pub use template::Plantilla;
