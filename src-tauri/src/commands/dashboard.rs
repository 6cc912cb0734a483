use crate::commands::{config, notificaciones};
use crate::db::Database;
use crate::models::ResumenDashboard;
use rusqlite::Connection;
use tauri::State;
use tracing::warn;

/// Cifra individual del tablero; si la consulta falla se muestra 0
fn cifra<T: rusqlite::types::FromSql + Default>(conn: &Connection, nombre: &str, sql: &str) -> T {
    match conn.query_row(sql, [], |row| row.get::<_, T>(0)) {
        Ok(v) => v,
        Err(e) => {
            warn!(cifra = nombre, error = %e, "no se pudo calcular la cifra del tablero");
            T::default()
        }
    }
}

pub fn resumen(conn: &Connection) -> ResumenDashboard {
    let notificaciones_no_leidas = notificaciones::contar_no_leidas_en(conn).unwrap_or_else(|e| {
        warn!(cifra = "notificaciones_no_leidas", error = %e, "no se pudo calcular la cifra del tablero");
        0
    });

    ResumenDashboard {
        clientes_activos: cifra(conn, "clientes_activos", "SELECT COUNT(*) FROM clientes WHERE activo = 1"),
        cotizaciones_pendientes: cifra(
            conn,
            "cotizaciones_pendientes",
            "SELECT COUNT(*) FROM cotizaciones WHERE estado IN ('PENDIENTE', 'APROBADA')",
        ),
        vehiculos_en_taller: cifra(
            conn,
            "vehiculos_en_taller",
            "SELECT COUNT(*) FROM vehiculos WHERE estado != 'ENTREGADO'",
        ),
        ingresos_mes: cifra(
            conn,
            "ingresos_mes",
            "SELECT COALESCE(SUM(monto), 0) FROM ingresos
             WHERE strftime('%Y-%m', fecha) = strftime('%Y-%m', 'now', 'localtime')",
        ),
        saldo_por_cobrar: cifra(
            conn,
            "saldo_por_cobrar",
            "SELECT COALESCE(SUM(saldo_pendiente), 0) FROM cotizaciones",
        ),
        notificaciones_no_leidas,
        intervalo_refresco_seg: config::valor_numerico(conn, "intervalo_refresco_seg", 30.0).max(5.0) as u64,
    }
}

#[tauri::command]
pub fn resumen_dashboard(db: State<Database>) -> Result<ResumenDashboard, String> {
    db.con(|conn| Ok(resumen(conn)))
}
