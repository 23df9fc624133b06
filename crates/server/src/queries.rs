//! Fixed SQL templates for the three data endpoints.
//!
//! Templates only ever interpolate trusted catalog/schema names; every
//! user-supplied value is carried as a named bind parameter on the returned
//! [`Statement`].

use cancha_warehouse::statement::{in_list_markers, Statement, StatementParam};
use cancha_warehouse::Catalogs;

fn quoted(catalog: &str) -> String {
    format!("`{catalog}`")
}

/// End-of-day stock per yard sector.
///
/// Joins the daily balance to lots, yards, locations, sectors, products and
/// containers; excludes discontinued products, virtual sectors, dispatch
/// zones and no-stock sectors; aggregates final stock per grouping key with
/// a tonnes conversion for yard 4.
pub fn stock(
    catalogs: &Catalogs,
    fecha: &str,
    codigos_centros: &[String],
    codigos_canchas: &[String],
) -> Statement {
    let catalog = quoted(&catalogs.catalog);
    let schema = &catalogs.schema;
    let link_schema = &catalogs.link_schema;

    let (centros_markers, centros_params) = in_list_markers("centro", codigos_centros);
    let (canchas_markers, canchas_params) = in_list_markers("cancha", codigos_canchas);

    let text = format!(
        "\
SELECT
    B.FECHA_MOVIMIENTO AS FECHA,
    C.NOMBRE AS centro,
    C.CODIGO AS cod_cancha,
    S.ID_SECTOR AS cod_sector,
    S.DESCRIPCION AS sector,
    PC.SIGLA AS producto,
    L.ESTADO_CALIDAD AS calidad,
    CONCAT(ENV.DESCRIPCION_CORTA,
           CASE WHEN ENV.COD_ENVASE = '16' THEN ''
           ELSE CONCAT(ENV.CAPACIDAD, ' ', ENV.UNIDAD_ENV) END) AS formato,
    SUM(CASE WHEN L.ALM_CODIGO = 4 THEN B.STOCK_FINAL / 1000 ELSE B.STOCK_FINAL END) AS stock
FROM
    {catalog}.{schema}.sdp_tb_balance_dia_productos B
JOIN
    {catalog}.{schema}.sdp_tb_lotes_inventario L ON B.ID_LOTE = L.ID_LOTE
JOIN
    {catalog}.{schema}.sdp_tb_canchas C ON L.ALM_CODIGO = C.CODIGO
JOIN
    {catalog}.{schema}.sdp_tb_ubicaciones U ON L.ALM_CODIGO = U.ALM_CODIGO AND L.ID_UBICACION = U.ID_UBICACION
JOIN
    {catalog}.{schema}.sdp_tb_sectores S ON L.ALM_CODIGO = S.UBI_ALM_CODIGO AND L.ID_UBICACION = S.UBI_ID_UBICACION AND L.ID_SECTOR = S.ID_SECTOR
JOIN
    {catalog}.{schema}.sdp_va_productos_canchas PC ON PC.COD_PRODUCTO = CAST(L.COD_PRODUCTO AS STRING)
JOIN
    {catalog}.{link_schema}.sdp_tb_envases ENV ON ENV.COD_ENVASE = L.COD_ENVASE
LEFT JOIN
    {catalog}.{schema}.sdp_tb_zonas_despacho ZD ON L.ALM_CODIGO = ZD.ALM_CODIGO AND L.ID_UBICACION = ZD.ID_UBICACION
LEFT JOIN
    {catalog}.{schema}.sdp_no_sector_stock NSS ON CAST(L.ALM_CODIGO AS STRING) = NSS.COD_CANCHA AND L.ID_UBICACION = NSS.COD_UBI AND L.ID_SECTOR = NSS.COD_SEC
WHERE
    B.FECHA_MOVIMIENTO = :fecha
    AND L.ALM_CODIGO IN ({centros_markers})
    AND L.ID_UBICACION IN ({canchas_markers})
    AND L.COD_PRODUCTO NOT IN (2220, 2308)
    AND UPPER(S.DESCRIPCION) NOT LIKE '%VIRTUAL%'
    AND ZD.ALM_CODIGO IS NULL
    AND NSS.COD_CANCHA IS NULL
GROUP BY
    B.FECHA_MOVIMIENTO,
    C.NOMBRE,
    C.CODIGO,
    S.ID_SECTOR,
    S.DESCRIPCION,
    PC.SIGLA,
    L.ESTADO_CALIDAD,
    CONCAT(ENV.DESCRIPCION_CORTA,
           CASE WHEN ENV.COD_ENVASE = '16' THEN ''
           ELSE CONCAT(ENV.CAPACIDAD, ' ', ENV.UNIDAD_ENV) END)
HAVING
    SUM(CASE WHEN L.ALM_CODIGO = 4 THEN B.STOCK_FINAL / 1000 ELSE B.STOCK_FINAL END) >= 0"
    );

    Statement::new(text)
        .bind(StatementParam::date("fecha", fecha))
        .bind_all(centros_params)
        .bind_all(canchas_params)
}

/// Daily lot consumption at the ulog yard (ALM_CODIGO 19).
///
/// The effective date of a lot is the latest of its modification, first
/// movement, or creation timestamps; lots sitting in dispatch zones or
/// no-stock sectors are excluded via correlated NOT EXISTS checks.
pub fn consume(catalogs: &Catalogs, fecha: &str) -> Statement {
    let catalog = quoted(&catalogs.catalog);
    let schema = &catalogs.schema;
    let link_schema = &catalogs.link_schema;

    let text = format!(
        "\
SELECT
    stli.NRO_INTERNO AS INTERNO,
    stli.CANTIDAD_REAL AS ACTUAL,
    stli.CANTIDAD_PRESUPUESTO AS ENTRADAS,
    ABS(stli.CANTIDAD_REAL - stli.CANTIDAD_PRESUPUESTO) AS SALIDAS,
    stu.DESCRIPCION AS CANCHA,
    sts.DESCRIPCION AS SECTOR,
    svpc.SIGLA AS PRODUCTO,
    date_format(stali.LIBERACION_LABORATORIO, 'yyyyMMddHHmm') AS OV,
    date_format(COALESCE(stli.FECHA_PRIMER_MOV, stli.FECHA_CREACION), 'dd-MM-yyyy') AS FechaEmisionLote,
    date_format(COALESCE(stli.FECHA_MODIFICACION, stli.FECHA_PRIMER_MOV, stli.FECHA_CREACION), 'dd-MM-yyyy') AS FechaUltimaModificacion
FROM
    {catalog}.{schema}.SDP_TB_LOTES_INVENTARIO stli
INNER JOIN
    {catalog}.{schema}.SDP_TB_GRUPOS_LOTES stgl ON stli.COD_GRUPO = stgl.COD_GRUPO
INNER JOIN
    {catalog}.{schema}.SDP_TB_ANEXO_LOTESINV stal ON stli.ID_LOTE = stal.ID_LOTE
INNER JOIN
    {catalog}.{schema}.SDP_TB_SECTORES sts ON stli.ALM_CODIGO = sts.UBI_ALM_CODIGO
    AND stli.ID_UBICACION = sts.UBI_ID_UBICACION
    AND stli.ID_SECTOR = sts.ID_SECTOR
INNER JOIN
    {catalog}.{schema}.SDP_TB_UBICACIONES stu ON stli.ALM_CODIGO = stu.ALM_CODIGO
    AND stli.ID_UBICACION = stu.ID_UBICACION
INNER JOIN
    {catalog}.{schema}.SDP_VA_PRODUCTOS_CANCHAS svpc ON CAST(stli.COD_PRODUCTO AS STRING) = svpc.cod_producto
INNER JOIN
    {catalog}.{link_schema}.SDP_TB_ENVASES ste ON stli.COD_ENVASE = ste.COD_ENVASE
INNER JOIN
    {catalog}.{schema}.SDP_TB_TIPO_CONTENEDORES sttc ON stli.COD_TIPO_CONTENEDOR = sttc.COD_TIPO
LEFT JOIN
    {catalog}.{schema}.SDP_TB_APROB_ESPECIALES stae ON stli.ID_LOTE = stae.NRO_LOTE_SQM
INNER JOIN
    {catalog}.{schema}.SDP_TB_PROPIETARIOS stp ON stli.RUT_PROPIETARIO = stp.RUT
INNER JOIN
    {catalog}.{schema}.CG_REF_CODES crc ON stli.ESTADO_CALIDAD = crc.RV_LOW_VALUE
INNER JOIN
    {catalog}.{schema}.SDP_TB_ANEXO_LOTESINV_II stali ON stli.ID_LOTE = stali.ID_LOTE
INNER JOIN
    {catalog}.{schema}.CG_REF_CODES crc2 ON crc2.RV_LOW_VALUE = stali.ESTADO_PLANTA
INNER JOIN
    {catalog}.{schema}.CG_REF_CODES crc3 ON crc3.RV_LOW_VALUE = stali.ESTADO_COMERCIAL
WHERE
    stli.ALM_CODIGO = 19
    AND crc2.RV_DOMAIN = 'SDP_TB_ANEXO_LOTESINV_II.ESTADO_PLANTA'
    AND crc3.RV_DOMAIN = 'SDP_TB_ANEXO_LOTESINV_II.ESTADO_COMERCIAL'
    AND TO_DATE(date_format(COALESCE(stli.FECHA_MODIFICACION, stli.FECHA_PRIMER_MOV, stli.FECHA_CREACION), 'dd-MM-yyyy'), 'dd-MM-yyyy') = TO_DATE(:fecha, 'dd-MM-yyyy')
    AND crc.RV_DOMAIN = 'SDP_TB_LOTES_INVENTARIO.ESTADO_CALIDAD'
    AND NOT EXISTS (
        SELECT 1
        FROM {catalog}.{schema}.SDP_TB_ZONAS_DESPACHO stzd
        WHERE stzd.ALM_CODIGO = stli.ALM_CODIGO
        AND stzd.ID_UBICACION = stli.ID_UBICACION
    )
    AND NOT EXISTS (
        SELECT 1
        FROM {catalog}.{schema}.SDP_NO_SECTOR_STOCK snss
        WHERE snss.cod_cancha = CAST(stli.ALM_CODIGO AS STRING)
        AND snss.COD_UBI = stli.ID_UBICACION
        AND snss.COD_SEC = stli.ID_SECTOR
    )
ORDER BY
    NRO_INTERNO"
    );

    Statement::new(text).bind(StatementParam::string("fecha", fecha))
}

/// Production-lot history for one plant over an inclusive date range.
///
/// Internal production lots only (type 'I', cancelled state 'A' excluded);
/// for yard 11 the internal number falls back to a Maxi container label.
/// The range filter compares dates, not the dd-MM-yyyy display strings.
pub fn historico(
    catalogs: &Catalogs,
    fecha_inicio: &str,
    fecha_fin: &str,
    id_planta: &str,
) -> Statement {
    let catalog = quoted(&catalogs.catalog);
    let schema = &catalogs.schema;
    let link_schema = &catalogs.link_schema;

    let text = format!(
        "\
SELECT
    DATE_FORMAT(stlp.FECHA_PRODUCCION, 'dd-MM-yyyy') AS fecha,
    stp.DESCRIPCION AS planta,
    stlp.ID_LOTE AS nro,
    TRIM(SUBSTR(crc2.RV_MEANING, 1, 6)) AS estado,
    stli.ID_LOTE AS nro_sqm,
    CASE
        WHEN stli.ALM_CODIGO = 11 THEN COALESCE(stli.NRO_INTERNO, CONCAT('Maxi ', stal.FIN_CONTENEDOR))
        ELSE stli.NRO_INTERNO
    END AS nro_int,
    stlp.TURNO AS turno,
    svpc1.SIGLA AS agregado,
    stlp.CANTIDAD AS cantidad,
    INITCAP(ste.DESCRIPCION_CORTA) AS envase,
    svpc2.SIGLA AS produccion
FROM
    {catalog}.{schema}.SDP_TB_LOTES_PRODUCCION stlp
INNER JOIN
    {catalog}.{schema}.CG_REF_CODES crc1 ON stlp.TIPO = crc1.RV_LOW_VALUE
INNER JOIN
    {catalog}.{schema}.CG_REF_CODES crc2 ON stlp.ESTADO = crc2.RV_LOW_VALUE
INNER JOIN
    {catalog}.{schema}.SDP_VA_PRODUCTOS_CANCHAS svpc1 ON CAST(stlp.COD_PRODUCTO AS STRING) = svpc1.COD_PRODUCTO
LEFT JOIN
    {catalog}.{schema}.SDP_VA_PRODUCTOS_CANCHAS svpc2 ON CAST(stlp.PRODUCTO_DE_AGREGADO AS STRING) = svpc2.COD_PRODUCTO
INNER JOIN
    {catalog}.{link_schema}.SDP_TB_ENVASES ste ON stlp.COD_ENVASE = ste.COD_ENVASE
INNER JOIN
    {catalog}.{schema}.CG_REF_CODES crc3 ON stlp.ESTADO_CALIDAD = crc3.RV_LOW_VALUE
LEFT JOIN
    {catalog}.{schema}.SDP_TB_LOTES_INVENTARIO stli ON stlp.ID_LOTE_INVENTARIO = stli.ID_LOTE
LEFT JOIN
    {catalog}.{schema}.SDP_TB_CANCHAS stc ON stli.ALM_CODIGO = stc.CODIGO
LEFT JOIN
    {catalog}.{schema}.SDP_TB_UBICACIONES stu ON stli.ALM_CODIGO = stu.ALM_CODIGO AND stli.ID_UBICACION = stu.ID_UBICACION
LEFT JOIN
    {catalog}.{schema}.SDP_TB_SECTORES sts ON stli.ALM_CODIGO = sts.UBI_ALM_CODIGO AND stli.ID_UBICACION = sts.UBI_ID_UBICACION AND stli.ID_SECTOR = sts.ID_SECTOR
LEFT JOIN
    {catalog}.{schema}.SDP_TB_ANEXO_LOTESINV stal ON stlp.ID_LOTE_INVENTARIO = stal.ID_LOTE
INNER JOIN
    {catalog}.{schema}.SDP_TB_PLANTAS stp ON stlp.ID_PLANTA = stp.ID_PLANTA
WHERE
    CAST(stlp.FECHA_PRODUCCION AS DATE) BETWEEN TO_DATE(:fecha_inicio, 'dd-MM-yyyy') AND TO_DATE(:fecha_fin, 'dd-MM-yyyy')
    AND stlp.ID_PLANTA = :id_planta
    AND stlp.TIPO = 'I'
    AND stlp.ESTADO <> 'A'
    AND crc1.RV_DOMAIN = 'SDP_TB_LOTES_PRODUCCION.TIPO'
    AND crc2.RV_DOMAIN = 'SDP_TB_LOTES_PRODUCCION.ESTADO'
    AND crc3.RV_DOMAIN = 'SDP_TB_LOTES_PRODUCCION.ESTADO_CALIDAD'"
    );

    Statement::new(text)
        .bind(StatementParam::string("fecha_inicio", fecha_inicio))
        .bind(StatementParam::string("fecha_fin", fecha_fin))
        .bind(StatementParam::string("id_planta", id_planta))
}
