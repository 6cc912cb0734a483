use crate::db::{Database, SesionState};
use crate::error::{Resultado, TallerError};
use crate::logica::pin;
use crate::models::{NuevoUsuario, SesionActiva, UsuarioInfo};
use rusqlite::Connection;
use tauri::State;
use tracing::{info, warn};

pub const ROLES: &[&str] = &["ADMIN", "RECEPCION"];

fn verificar_admin(sesion: Option<&SesionActiva>) -> Resultado<()> {
    match sesion {
        Some(s) if s.rol == "ADMIN" => Ok(()),
        Some(_) => Err(TallerError::validacion("Se requiere permisos de administrador")),
        None => Err(TallerError::validacion("Debe iniciar sesión")),
    }
}

/// Busca el usuario activo cuyo PIN coincide
pub fn autenticar(conn: &Connection, pin_ingresado: &str) -> Resultado<SesionActiva> {
    let mut stmt =
        conn.prepare("SELECT id, nombre, pin_hash, pin_salt, rol FROM usuarios WHERE activo = 1")?;
    let usuarios: Vec<(i64, String, String, String, String)> = stmt
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    usuarios
        .into_iter()
        .find(|(_, _, hash, salt, _)| pin::verificar(salt, pin_ingresado, hash))
        .map(|(usuario_id, nombre, _, _, rol)| SesionActiva {
            usuario_id,
            nombre,
            rol,
        })
        .ok_or_else(|| {
            warn!("intento de inicio de sesión con PIN incorrecto");
            TallerError::validacion("PIN incorrecto")
        })
}

pub fn crear(conn: &Connection, sesion: Option<&SesionActiva>, usuario: &NuevoUsuario) -> Resultado<UsuarioInfo> {
    verificar_admin(sesion)?;
    pin::validar(&usuario.pin)?;

    let rol = usuario.rol.trim().to_uppercase();
    if !ROLES.contains(&rol.as_str()) {
        return Err(TallerError::validacion("El rol debe ser ADMIN o RECEPCION"));
    }
    let nombre = usuario.nombre.trim().to_uppercase();
    if nombre.is_empty() {
        return Err(TallerError::validacion("El nombre no puede estar vacío"));
    }

    let existe: i64 = conn.query_row(
        "SELECT COUNT(*) FROM usuarios WHERE nombre = ?1",
        rusqlite::params![nombre],
        |row| row.get(0),
    )?;
    if existe > 0 {
        return Err(TallerError::Duplicado(format!(
            "Ya existe un usuario con el nombre '{}'",
            nombre
        )));
    }

    let salt = pin::generar_salt();
    conn.execute(
        "INSERT INTO usuarios (nombre, pin_hash, pin_salt, rol, activo)
         VALUES (?1, ?2, ?3, ?4, 1)",
        rusqlite::params![nombre, pin::hash_pin(&salt, &usuario.pin), salt, rol],
    )?;
    let id = conn.last_insert_rowid();
    info!(usuario_id = id, rol = %rol, "usuario creado");

    Ok(UsuarioInfo {
        id,
        nombre,
        rol,
        activo: true,
    })
}

pub fn listar(conn: &Connection, sesion: Option<&SesionActiva>) -> Resultado<Vec<UsuarioInfo>> {
    verificar_admin(sesion)?;
    let mut stmt = conn.prepare("SELECT id, nombre, rol, activo FROM usuarios ORDER BY id")?;
    let usuarios = stmt
        .query_map([], |row| {
            Ok(UsuarioInfo {
                id: row.get(0)?,
                nombre: row.get(1)?,
                rol: row.get(2)?,
                activo: row.get::<_, i64>(3)? == 1,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(usuarios)
}

/// Baja lógica; el último administrador activo no se puede desactivar
pub fn desactivar(conn: &Connection, sesion: Option<&SesionActiva>, id: i64) -> Resultado<()> {
    verificar_admin(sesion)?;
    let rol: String = crate::error::o_no_encontrado(
        conn.query_row(
            "SELECT rol FROM usuarios WHERE id = ?1",
            rusqlite::params![id],
            |row| row.get(0),
        ),
        "Usuario",
    )?;

    if rol == "ADMIN" {
        let otros: i64 = conn.query_row(
            "SELECT COUNT(*) FROM usuarios WHERE rol = 'ADMIN' AND activo = 1 AND id != ?1",
            rusqlite::params![id],
            |row| row.get(0),
        )?;
        if otros == 0 {
            return Err(TallerError::validacion(
                "No se puede eliminar el último administrador activo",
            ));
        }
    }

    conn.execute("UPDATE usuarios SET activo = 0 WHERE id = ?1", rusqlite::params![id])?;
    Ok(())
}

fn sesion_actual(sesion: &State<SesionState>) -> Result<Option<SesionActiva>, String> {
    let guard = sesion.sesion.lock().map_err(|e| e.to_string())?;
    Ok(guard.clone())
}

/// Verifica el PIN contra todos los usuarios activos.
/// Si coincide, establece la sesión activa.
#[tauri::command]
pub fn iniciar_sesion(
    db: State<Database>,
    sesion: State<SesionState>,
    pin: String,
) -> Result<SesionActiva, String> {
    let nueva = db.con(|conn| autenticar(conn, &pin))?;
    let mut guard = sesion.sesion.lock().map_err(|e| e.to_string())?;
    *guard = Some(nueva.clone());
    info!(usuario = %nueva.nombre, "sesión iniciada");
    Ok(nueva)
}

#[tauri::command]
pub fn cerrar_sesion(sesion: State<SesionState>) -> Result<(), String> {
    let mut guard = sesion.sesion.lock().map_err(|e| e.to_string())?;
    *guard = None;
    Ok(())
}

/// Retorna la sesión activa (o null si no hay)
#[tauri::command]
pub fn obtener_sesion_actual(sesion: State<SesionState>) -> Result<Option<SesionActiva>, String> {
    sesion_actual(&sesion)
}

#[tauri::command]
pub fn crear_usuario(
    db: State<Database>,
    sesion: State<SesionState>,
    usuario: NuevoUsuario,
) -> Result<UsuarioInfo, String> {
    let actual = sesion_actual(&sesion)?;
    db.con(|conn| crear(conn, actual.as_ref(), &usuario))
}

#[tauri::command]
pub fn listar_usuarios(
    db: State<Database>,
    sesion: State<SesionState>,
) -> Result<Vec<UsuarioInfo>, String> {
    let actual = sesion_actual(&sesion)?;
    db.con(|conn| listar(conn, actual.as_ref()))
}

#[tauri::command]
pub fn eliminar_usuario(db: State<Database>, sesion: State<SesionState>, id: i64) -> Result<(), String> {
    let actual = sesion_actual(&sesion)?;
    db.con(|conn| desactivar(conn, actual.as_ref(), id))
}
