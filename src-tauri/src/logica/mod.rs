pub mod estados;
pub mod pin;
pub mod saldos;
pub mod validacion;
pub mod whatsapp;
