mod commands;
mod db;
mod documentos;
mod error;
mod logica;
mod models;

use db::{Database, SesionState};
use std::sync::Mutex;

/// Variable de entorno con el filtro de logs (`info`, `taller_carroceria_lib=debug`...)
const ENV_LOG: &str = "TALLER_LOG";

fn iniciar_logs() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| "info".into()),
        )
        .init();
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    iniciar_logs();

    let database = Database::new().unwrap_or_else(|e| {
        tracing::error!(error = %e, ruta = %db::get_db_path().display(), "no se pudo abrir la base de datos");
        panic!("Error al inicializar la base de datos: {}", e)
    });
    let sesion_state = SesionState {
        sesion: Mutex::new(None),
    };

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "iniciando Taller Carrocería");

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .manage(database)
        .manage(sesion_state)
        .invoke_handler(tauri::generate_handler![
            // Clientes
            commands::clientes::crear_cliente,
            commands::clientes::actualizar_cliente,
            commands::clientes::eliminar_cliente,
            commands::clientes::obtener_cliente,
            commands::clientes::listar_clientes,
            commands::clientes::buscar_clientes,
            commands::clientes::historial_cliente,
            // Cotizaciones
            commands::cotizaciones::crear_cotizacion,
            commands::cotizaciones::crear_cotizacion_con_cliente,
            commands::cotizaciones::actualizar_cotizacion,
            commands::cotizaciones::eliminar_cotizacion,
            commands::cotizaciones::obtener_cotizacion,
            commands::cotizaciones::listar_cotizaciones,
            commands::cotizaciones::avanzar_estado_cotizacion,
            commands::cotizaciones::actualizar_pago_cotizacion,
            commands::cotizaciones::calcular_saldo,
            // Vehículos y órdenes de taller
            commands::vehiculos::crear_vehiculo,
            commands::vehiculos::actualizar_vehiculo,
            commands::vehiculos::eliminar_vehiculo,
            commands::vehiculos::obtener_vehiculo,
            commands::vehiculos::listar_vehiculos,
            commands::vehiculos::avanzar_estado_vehiculo,
            commands::ordenes::crear_orden,
            commands::ordenes::actualizar_orden,
            commands::ordenes::eliminar_orden,
            commands::ordenes::listar_ordenes_vehiculo,
            commands::ordenes::avanzar_estado_orden,
            // Pagos e ingresos
            commands::pagos::registrar_pago,
            commands::pagos::listar_pagos,
            commands::pagos::eliminar_pago,
            commands::ingresos::crear_ingreso,
            commands::ingresos::listar_ingresos,
            commands::ingresos::total_ingresos,
            // Notificaciones
            commands::notificaciones::listar_notificaciones,
            commands::notificaciones::contar_no_leidas,
            commands::notificaciones::marcar_leida,
            commands::notificaciones::marcar_todas_leidas,
            commands::notificaciones::eliminar_notificacion,
            commands::notificaciones::crear_notificacion,
            // Contactos / WhatsApp
            commands::contactos::analizar_chat_whatsapp,
            commands::contactos::importar_chat_whatsapp,
            commands::contactos::crear_contacto,
            commands::contactos::listar_contactos,
            commands::contactos::eliminar_contacto,
            commands::contactos::convertir_contacto_en_cliente,
            // Tablero
            commands::dashboard::resumen_dashboard,
            // Esquema
            commands::esquema::listar_tablas,
            commands::esquema::listar_columnas,
            // Documentos
            commands::documentos::generar_cotizacion_html,
            commands::documentos::exportar_cotizacion_html,
            // Configuración
            commands::config::obtener_config,
            commands::config::guardar_config,
            commands::config::cargar_logo_negocio,
            commands::config::eliminar_logo_negocio,
            // Exportar CSV
            commands::exportar::exportar_cotizaciones_csv,
            commands::exportar::exportar_pagos_csv,
            commands::exportar::exportar_clientes_csv,
            commands::exportar::guardar_archivo_texto,
            // Respaldo
            commands::respaldo::obtener_ruta_db,
            commands::respaldo::crear_respaldo,
            commands::respaldo::restaurar_respaldo,
            // Usuarios / Sesión
            commands::usuarios::iniciar_sesion,
            commands::usuarios::cerrar_sesion,
            commands::usuarios::obtener_sesion_actual,
            commands::usuarios::crear_usuario,
            commands::usuarios::listar_usuarios,
            commands::usuarios::eliminar_usuario,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
