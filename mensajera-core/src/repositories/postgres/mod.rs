// src/repositories/postgres/mod.rs

pub mod campanas;
pub mod clientes;
pub mod conversaciones;
pub mod credentials;
pub mod event_log;
pub mod mensajes;
pub mod plantillas;
