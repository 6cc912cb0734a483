pub mod cliente;
pub mod cotizacion;
pub mod vehiculo;
pub mod pago;
pub mod notificacion;
pub mod contacto;
pub mod usuario;
pub mod dashboard;

pub use cliente::*;
pub use cotizacion::*;
pub use vehiculo::*;
pub use pago::*;
pub use notificacion::*;
pub use contacto::*;
pub use usuario::*;
pub use dashboard::*;
