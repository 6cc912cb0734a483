pub mod cotizacion_html;
