use rusqlite::Connection;

pub fn create_tables(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        -- Configuración del taller
        CREATE TABLE IF NOT EXISTS config (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        -- Clientes
        CREATE TABLE IF NOT EXISTS clientes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nombre TEXT NOT NULL,
            telefono TEXT NOT NULL,
            email TEXT,
            direccion TEXT,
            rfc TEXT,
            notas TEXT,
            activo INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
        );
        CREATE INDEX IF NOT EXISTS idx_clientes_telefono ON clientes(telefono);
        CREATE INDEX IF NOT EXISTS idx_clientes_nombre ON clientes(nombre);

        -- Cotizaciones
        CREATE TABLE IF NOT EXISTS cotizaciones (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            folio TEXT NOT NULL UNIQUE,
            cliente_id INTEGER NOT NULL,
            vehiculo_marca TEXT,
            vehiculo_modelo TEXT,
            vehiculo_anio INTEGER,
            placas TEXT,
            descripcion TEXT,
            subtotal REAL NOT NULL DEFAULT 0,
            iva REAL NOT NULL DEFAULT 0,
            total REAL NOT NULL DEFAULT 0,
            anticipo REAL NOT NULL DEFAULT 0,
            pago1 REAL NOT NULL DEFAULT 0,
            liquidacion REAL NOT NULL DEFAULT 0,
            saldo_pendiente REAL NOT NULL DEFAULT 0,
            estado TEXT NOT NULL DEFAULT 'PENDIENTE',
            notas TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
            FOREIGN KEY (cliente_id) REFERENCES clientes(id)
        );
        CREATE INDEX IF NOT EXISTS idx_cotizaciones_cliente ON cotizaciones(cliente_id);
        CREATE INDEX IF NOT EXISTS idx_cotizaciones_estado ON cotizaciones(estado);

        CREATE TABLE IF NOT EXISTS cotizacion_conceptos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            cotizacion_id INTEGER NOT NULL,
            descripcion TEXT NOT NULL,
            cantidad REAL NOT NULL DEFAULT 1,
            precio_unitario REAL NOT NULL DEFAULT 0,
            importe REAL NOT NULL DEFAULT 0,
            FOREIGN KEY (cotizacion_id) REFERENCES cotizaciones(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_conceptos_cotizacion ON cotizacion_conceptos(cotizacion_id);

        -- Vehículos recibidos en el taller (cada ingreso lleva su folio físico)
        CREATE TABLE IF NOT EXISTS vehiculos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            folio TEXT NOT NULL UNIQUE,
            cliente_id INTEGER NOT NULL,
            cotizacion_id INTEGER,
            marca TEXT NOT NULL,
            modelo TEXT,
            anio INTEGER,
            color TEXT,
            placas TEXT,
            kilometraje INTEGER,
            fecha_ingreso TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
            fecha_entrega_estimada TEXT,
            fecha_entrega TEXT,
            estado TEXT NOT NULL DEFAULT 'RECIBIDO',
            notas TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
            FOREIGN KEY (cliente_id) REFERENCES clientes(id),
            FOREIGN KEY (cotizacion_id) REFERENCES cotizaciones(id) ON DELETE SET NULL
        );
        CREATE INDEX IF NOT EXISTS idx_vehiculos_cliente ON vehiculos(cliente_id);
        CREATE INDEX IF NOT EXISTS idx_vehiculos_estado ON vehiculos(estado);

        -- Trabajos por área sobre un vehículo
        CREATE TABLE IF NOT EXISTS ordenes_taller (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            vehiculo_id INTEGER NOT NULL,
            area TEXT NOT NULL DEFAULT 'OTRO',
            descripcion TEXT NOT NULL,
            tecnico TEXT,
            costo REAL NOT NULL DEFAULT 0,
            estado TEXT NOT NULL DEFAULT 'PENDIENTE',
            created_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
            FOREIGN KEY (vehiculo_id) REFERENCES vehiculos(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_ordenes_vehiculo ON ordenes_taller(vehiculo_id);

        -- Pagos recibidos
        CREATE TABLE IF NOT EXISTS pagos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            cotizacion_id INTEGER,
            cliente_id INTEGER,
            concepto TEXT NOT NULL DEFAULT 'OTRO',
            monto REAL NOT NULL,
            metodo TEXT NOT NULL DEFAULT 'EFECTIVO',
            referencia TEXT,
            notas TEXT,
            fecha TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
            FOREIGN KEY (cotizacion_id) REFERENCES cotizaciones(id) ON DELETE SET NULL,
            FOREIGN KEY (cliente_id) REFERENCES clientes(id)
        );
        CREATE INDEX IF NOT EXISTS idx_pagos_cotizacion ON pagos(cotizacion_id);
        CREATE INDEX IF NOT EXISTS idx_pagos_fecha ON pagos(fecha);

        -- Ingresos del taller (pagos y entradas manuales)
        CREATE TABLE IF NOT EXISTS ingresos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            concepto TEXT NOT NULL,
            monto REAL NOT NULL,
            categoria TEXT NOT NULL DEFAULT 'SERVICIO',
            pago_id INTEGER,
            fecha TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
            notas TEXT,
            FOREIGN KEY (pago_id) REFERENCES pagos(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_ingresos_fecha ON ingresos(fecha);

        -- Notificaciones / actividad
        CREATE TABLE IF NOT EXISTS notificaciones (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tipo TEXT NOT NULL DEFAULT 'SISTEMA',
            titulo TEXT NOT NULL,
            mensaje TEXT,
            entidad TEXT,
            entidad_id INTEGER,
            leida INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
        );
        CREATE INDEX IF NOT EXISTS idx_notificaciones_leida ON notificaciones(leida);

        -- Contactos capturados desde conversaciones de WhatsApp
        CREATE TABLE IF NOT EXISTS contactos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nombre TEXT,
            telefono TEXT,
            vehiculo TEXT,
            servicios TEXT,
            resumen TEXT,
            origen TEXT NOT NULL DEFAULT 'WHATSAPP',
            cliente_id INTEGER,
            created_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
            FOREIGN KEY (cliente_id) REFERENCES clientes(id)
        );

        -- Usuarios (login por PIN)
        CREATE TABLE IF NOT EXISTS usuarios (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nombre TEXT NOT NULL UNIQUE,
            pin_hash TEXT NOT NULL,
            pin_salt TEXT NOT NULL,
            rol TEXT NOT NULL DEFAULT 'RECEPCION',
            activo INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
        );
        ",
    )?;

    let defaults = [
        ("nombre_negocio", "MI TALLER"),
        ("rfc", ""),
        ("direccion", ""),
        ("telefono", ""),
        ("email", ""),
        ("iva_porcentaje", "16"),
        ("secuencial_cotizacion", "1"),
        ("vigencia_dias", "15"),
        ("intervalo_refresco_seg", "30"),
        (
            "nota_cotizacion",
            "Precios sujetos a cambio sin previo aviso. Refacciones adicionales se cotizan por separado.",
        ),
    ];
    for (key, value) in defaults {
        conn.execute(
            "INSERT OR IGNORE INTO config (key, value) VALUES (?1, ?2)",
            rusqlite::params![key, value],
        )?;
    }

    Ok(())
}
