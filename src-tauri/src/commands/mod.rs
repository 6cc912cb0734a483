pub mod clientes;
pub mod config;
pub mod contactos;
pub mod cotizaciones;
pub mod dashboard;
pub mod documentos;
pub mod esquema;
pub mod exportar;
pub mod ingresos;
pub mod notificaciones;
pub mod ordenes;
pub mod pagos;
pub mod respaldo;
pub mod usuarios;
pub mod vehiculos;
