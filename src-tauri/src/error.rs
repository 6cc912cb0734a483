use thiserror::Error;

/// Errores de las operaciones del taller. Los comandos los convierten al
/// texto que el frontend muestra en el aviso.
#[derive(Debug, Error)]
pub enum TallerError {
    #[error("{0}")]
    Validacion(String),

    #[error("{0} no encontrado")]
    NoEncontrado(String),

    #[error("{0}")]
    Duplicado(String),

    #[error("Error de base de datos: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Error de archivo: {0}")]
    Io(#[from] std::io::Error),

    #[error("La base de datos está bloqueada")]
    Bloqueo,
}

pub type Resultado<T> = Result<T, TallerError>;

impl TallerError {
    pub fn validacion(msg: impl Into<String>) -> Self {
        TallerError::Validacion(msg.into())
    }

    pub fn no_encontrado(que: impl Into<String>) -> Self {
        TallerError::NoEncontrado(que.into())
    }
}

impl<T> From<std::sync::PoisonError<T>> for TallerError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        TallerError::Bloqueo
    }
}

/// `query_row` sin filas se reporta como `NoEncontrado(que)`.
pub fn o_no_encontrado<T>(res: rusqlite::Result<T>, que: &str) -> Resultado<T> {
    match res {
        Ok(v) => Ok(v),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(TallerError::no_encontrado(que)),
        Err(e) => Err(TallerError::Db(e)),
    }
}
