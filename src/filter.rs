use chrono::naive::NaiveDateTime;
use geo_types::Rect;
use rusqlite::types::Value as SqlValue;
use serde_json::{json, Value};

use crate::{
    crs::Vector,
    error::{Result, S1ArchError},
    product::{AcquisitionMode, Product},
    scene_name::TIME_FORMAT,
    sensor::Sensor,
};

/// Search constraints. `None` leaves a key unconstrained.
#[derive(Clone, Debug)]
pub struct SearchFilter {
    pub sensor: Option<Vec<Sensor>>,
    pub product: Option<Vec<Product>>,
    pub acquisition_mode: Option<Vec<AcquisitionMode>>,
    pub mindate: Option<NaiveDateTime>,
    pub maxdate: Option<NaiveDateTime>,
    /// Datatake ids in decimal representation.
    pub frame_number: Option<Vec<u32>>,
    pub vectorobject: Option<Vector>,
    /// strict: `start >= mindate && stop <= maxdate`,
    /// otherwise: `stop >= mindate && start <= maxdate`
    pub date_strict: bool,
    /// Fail on catalog entries that do not exist on the local file system.
    pub check_exist: bool,
}

impl Default for SearchFilter {
    fn default() -> Self {
        SearchFilter {
            sensor: None,
            product: None,
            acquisition_mode: None,
            mindate: None,
            maxdate: None,
            frame_number: None,
            vectorobject: None,
            date_strict: true,
            check_exist: true,
        }
    }
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sensor(mut self, sensor: Sensor) -> Self {
        self.sensor = Some(vec![sensor]);
        self
    }

    pub fn product(mut self, product: Product) -> Self {
        self.product = Some(vec![product]);
        self
    }

    pub fn acquisition_mode(mut self, mode: AcquisitionMode) -> Self {
        self.acquisition_mode = Some(vec![mode]);
        self
    }

    pub fn acquisition_modes(mut self, modes: Vec<AcquisitionMode>) -> Self {
        self.acquisition_mode = Some(modes);
        self
    }

    pub fn mindate(mut self, mindate: NaiveDateTime) -> Self {
        self.mindate = Some(mindate);
        self
    }

    pub fn maxdate(mut self, maxdate: NaiveDateTime) -> Self {
        self.maxdate = Some(maxdate);
        self
    }

    pub fn frame_number(mut self, datatake: u32) -> Self {
        self.frame_number = Some(vec![datatake]);
        self
    }

    pub fn vectorobject(mut self, vector: Vector) -> Self {
        self.vectorobject = Some(vector);
        self
    }

    pub fn date_strict(mut self, strict: bool) -> Self {
        self.date_strict = strict;
        self
    }

    pub fn check_exist(mut self, check: bool) -> Self {
        self.check_exist = check;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Platform,
    ProductType,
    InstrumentMode,
    Start,
    Stop,
    Datatake,
}

impl Field {
    fn stac_property(&self) -> &'static str {
        match *self {
            Field::Platform => "platform",
            Field::ProductType => "sar:product_type",
            Field::InstrumentMode => "sar:instrument_mode",
            Field::Start => "start_datetime",
            Field::Stop => "end_datetime",
            Field::Datatake => "s1:datatake",
        }
    }

    fn sql_column(&self) -> &'static str {
        match *self {
            Field::Platform => "sensor",
            Field::ProductType => "product",
            Field::InstrumentMode => "acquisition_mode",
            Field::Start => "start",
            Field::Stop => "stop",
            Field::Datatake => "frame_number",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ge,
    Le,
}

impl CmpOp {
    fn symbol(&self) -> &'static str {
        match *self {
            CmpOp::Eq => "=",
            CmpOp::Ge => ">=",
            CmpOp::Le => "<=",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Sensor(Sensor),
    Text(String),
    Time(NaiveDateTime),
}

/// Catalog independent boolean query, rendered per catalog dialect.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterExpr {
    And(Vec<FilterExpr>),
    Or(Vec<FilterExpr>),
    Cmp {
        field: Field,
        op: CmpOp,
        value: Literal,
    },
    /// Bounding rectangle in WGS84.
    Intersects(Rect<f64>),
}

impl FilterExpr {
    pub fn build(filter: &SearchFilter) -> Result<Self> {
        let mut args: Vec<FilterExpr> = vec![];

        if let Some(sensors) = &filter.sensor {
            args.push(any_of(
                "sensor",
                Field::Platform,
                sensors.iter().map(|s| Literal::Sensor(*s)),
            )?);
        }
        if let Some(products) = &filter.product {
            args.push(any_of(
                "product",
                Field::ProductType,
                products.iter().map(|p| Literal::Text(p.to_string())),
            )?);
        }
        if let Some(modes) = &filter.acquisition_mode {
            args.push(any_of(
                "acquisition_mode",
                Field::InstrumentMode,
                modes.iter().map(|m| Literal::Text(m.to_string())),
            )?);
        }
        if let Some(mindate) = filter.mindate {
            let field = if filter.date_strict { Field::Start } else { Field::Stop };
            args.push(FilterExpr::Cmp {
                field,
                op: CmpOp::Ge,
                value: Literal::Time(mindate),
            });
        }
        if let Some(maxdate) = filter.maxdate {
            let field = if filter.date_strict { Field::Stop } else { Field::Start };
            args.push(FilterExpr::Cmp {
                field,
                op: CmpOp::Le,
                value: Literal::Time(maxdate),
            });
        }
        if let Some(frames) = &filter.frame_number {
            args.push(any_of(
                "frame_number",
                Field::Datatake,
                frames.iter().map(|f| Literal::Text(format!("{:06X}", f))),
            )?);
        }
        if let Some(vector) = &filter.vectorobject {
            args.push(FilterExpr::Intersects(spatial_extent(vector)?));
        }

        Ok(FilterExpr::And(args))
    }

    /// CQL2-JSON as accepted by the STAC API filter extension.
    pub fn to_cql2(&self) -> Value {
        match self {
            FilterExpr::And(args) => json!({
                "op": "and",
                "args": args.iter().map(|a| a.to_cql2()).collect::<Vec<_>>(),
            }),
            FilterExpr::Or(args) => json!({
                "op": "or",
                "args": args.iter().map(|a| a.to_cql2()).collect::<Vec<_>>(),
            }),
            FilterExpr::Cmp { field, op, value } => {
                let value = match value {
                    Literal::Sensor(s) => json!(s.stac_platform()),
                    Literal::Text(t) => json!(t),
                    Literal::Time(t) => {
                        json!({ "timestamp": t.format("%Y-%m-%dT%H:%M:%SZ").to_string() })
                    }
                };
                json!({
                    "op": op.symbol(),
                    "args": [{ "property": field.stac_property() }, value],
                })
            }
            FilterExpr::Intersects(rect) => {
                let (min, max) = (rect.min(), rect.max());
                json!({
                    "op": "s_intersects",
                    "args": [
                        { "property": "geometry" },
                        {
                            "type": "Polygon",
                            "coordinates": [[
                                [min.x, min.y],
                                [min.x, max.y],
                                [max.x, max.y],
                                [max.x, min.y],
                                [min.x, min.y],
                            ]],
                        },
                    ],
                })
            }
        }
    }

    /// SQL condition with positional parameters for the local scene table.
    pub fn to_sql(&self) -> (String, Vec<SqlValue>) {
        let mut params = vec![];
        let sql = self.write_sql(&mut params);
        (sql, params)
    }

    fn write_sql(&self, params: &mut Vec<SqlValue>) -> String {
        match self {
            FilterExpr::And(args) if args.is_empty() => "1 = 1".into(),
            FilterExpr::Or(args) if args.is_empty() => "1 = 0".into(),
            FilterExpr::And(args) => join_sql(args, " AND ", params),
            FilterExpr::Or(args) => join_sql(args, " OR ", params),
            FilterExpr::Cmp { field, op, value } => {
                params.push(match value {
                    Literal::Sensor(s) => SqlValue::Text(s.to_string()),
                    Literal::Text(t) => SqlValue::Text(t.clone()),
                    Literal::Time(t) => SqlValue::Text(t.format(TIME_FORMAT).to_string()),
                });
                format!("{} {} ?", field.sql_column(), op.symbol())
            }
            FilterExpr::Intersects(rect) => {
                params.push(SqlValue::Real(rect.min().x));
                params.push(SqlValue::Real(rect.max().x));
                params.push(SqlValue::Real(rect.min().y));
                params.push(SqlValue::Real(rect.max().y));
                "(xmax >= ? AND xmin <= ? AND ymax >= ? AND ymin <= ?)".into()
            }
        }
    }
}

fn join_sql(args: &[FilterExpr], sep: &str, params: &mut Vec<SqlValue>) -> String {
    let parts: Vec<String> = args.iter().map(|a| a.write_sql(params)).collect();
    format!("({})", parts.join(sep))
}

fn any_of<I: Iterator<Item = Literal>>(
    key: &'static str,
    field: Field,
    values: I,
) -> Result<FilterExpr> {
    let mut args: Vec<FilterExpr> = values
        .map(|value| FilterExpr::Cmp {
            field,
            op: CmpOp::Eq,
            value,
        })
        .collect();

    match args.len() {
        0 => Err(S1ArchError::InvalidFilterType {
            key,
            message: "empty list of allowed values".into(),
        }),
        1 => Ok(args.remove(0)),
        _ => Ok(FilterExpr::Or(args)),
    }
}

fn spatial_extent(vector: &Vector) -> Result<Rect<f64>> {
    if !vector.is_areal() {
        return Err(S1ArchError::InvalidFilterType {
            key: "vectorobject",
            message: format!("expected an areal geometry, got {:?}", vector.geometry()),
        });
    }

    vector
        .to_wgs84()?
        .bounding_rect()
        .ok_or_else(|| S1ArchError::InvalidFilterType {
            key: "vectorobject",
            message: "empty geometry".into(),
        })
}
