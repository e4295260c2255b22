//! The tool surface: a static catalog plus a name-based dispatcher.
//!
//! Each tool maps onto one [`QueryEngine`] operation. Arguments arrive as a
//! JSON object and are deserialised into a typed struct before the engine is
//! touched, so shape errors never reach the query layer.

use crate::error::AppError;
use analytics::{DEFAULT_DAY_LIMIT, QueryEngine};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// One parameter of a tool.
#[derive(Debug, Clone, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub description: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<i64>,
}

/// One callable tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

const SYMBOL: ParamSpec = ParamSpec {
    name: "symbol",
    kind: "string",
    description: "Symbol identifier, e.g. ^GSPC or ^NDX",
    required: true,
    default: None,
};
const START_DATE: ParamSpec = ParamSpec {
    name: "start_date",
    kind: "string",
    description: "First day of the period (YYYY-MM-DD), inclusive",
    required: true,
    default: None,
};
const END_DATE: ParamSpec = ParamSpec {
    name: "end_date",
    kind: "string",
    description: "Last day of the period (YYYY-MM-DD), inclusive",
    required: true,
    default: None,
};
const YEAR: ParamSpec = ParamSpec {
    name: "year",
    kind: "integer",
    description: "Calendar year, e.g. 2020",
    required: true,
    default: None,
};
const LIMIT: ParamSpec = ParamSpec {
    name: "limit",
    kind: "integer",
    description: "Number of days to return",
    required: false,
    default: Some(DEFAULT_DAY_LIMIT),
};

static CATALOG: &[ToolSpec] = &[
    ToolSpec {
        name: "list_symbols",
        description: "List the available symbols with their display names",
        params: &[],
    },
    ToolSpec {
        name: "get_price_range",
        description: "Min, max and average close of a symbol over a period, \
                      with the dates of the extremes",
        params: &[SYMBOL, START_DATE, END_DATE],
    },
    ToolSpec {
        name: "get_price_on_date",
        description: "The open, high, low, close and volume of a symbol on one date",
        params: &[
            SYMBOL,
            ParamSpec {
                name: "date",
                kind: "string",
                description: "Trading day (YYYY-MM-DD)",
                required: true,
                default: None,
            },
        ],
    },
    ToolSpec {
        name: "compare_symbols",
        description: "Price range and period return of several symbols over the same period",
        params: &[
            ParamSpec {
                name: "symbols",
                kind: "array<string>",
                description: "Symbol identifiers, e.g. [\"^GSPC\", \"^NDX\"]",
                required: true,
                default: None,
            },
            START_DATE,
            END_DATE,
        ],
    },
    ToolSpec {
        name: "get_worst_days",
        description: "The largest day-over-day declines of a symbol in a year",
        params: &[SYMBOL, YEAR, LIMIT],
    },
    ToolSpec {
        name: "get_best_days",
        description: "The largest day-over-day gains of a symbol in a year",
        params: &[SYMBOL, YEAR, LIMIT],
    },
    ToolSpec {
        name: "get_yearly_summary",
        description: "Start and end close, return and close statistics of a symbol for a year",
        params: &[SYMBOL, YEAR],
    },
];

pub fn tool_catalog() -> &'static [ToolSpec] {
    CATALOG
}

mod params {
    use super::DEFAULT_DAY_LIMIT;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct NoArgs {}

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct PriceRange {
        pub symbol: String,
        pub start_date: String,
        pub end_date: String,
    }

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct PriceOnDate {
        pub symbol: String,
        pub date: String,
    }

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct Compare {
        pub symbols: Vec<String>,
        pub start_date: String,
        pub end_date: String,
    }

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct RankedDays {
        pub symbol: String,
        pub year: i64,
        #[serde(default = "default_limit")]
        pub limit: i64,
    }
    fn default_limit() -> i64 {
        DEFAULT_DAY_LIMIT
    }

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct Yearly {
        pub symbol: String,
        pub year: i64,
    }
}

/// Invokes one tool by name. A `null` argument value is treated as `{}`.
pub fn call_tool(engine: &QueryEngine, name: &str, args: Value) -> Result<Value, AppError> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    tracing::debug!(tool = name, "call_tool");

    match name {
        "list_symbols" => {
            let params::NoArgs {} = parse(name, args)?;
            to_json(engine.list_symbols()?)
        }
        "get_price_range" => {
            let a: params::PriceRange = parse(name, args)?;
            to_json(engine.get_price_range(&a.symbol, &a.start_date, &a.end_date)?)
        }
        "get_price_on_date" => {
            let a: params::PriceOnDate = parse(name, args)?;
            to_json(engine.get_price_on_date(&a.symbol, &a.date)?)
        }
        "compare_symbols" => {
            let a: params::Compare = parse(name, args)?;
            to_json(engine.compare_symbols(a.symbols.as_slice(), &a.start_date, &a.end_date)?)
        }
        "get_worst_days" => {
            let a: params::RankedDays = parse(name, args)?;
            to_json(engine.get_worst_days(&a.symbol, a.year, a.limit)?)
        }
        "get_best_days" => {
            let a: params::RankedDays = parse(name, args)?;
            to_json(engine.get_best_days(&a.symbol, a.year, a.limit)?)
        }
        "get_yearly_summary" => {
            let a: params::Yearly = parse(name, args)?;
            to_json(engine.get_yearly_summary(&a.symbol, a.year)?)
        }
        other => Err(AppError::UnknownTool(other.to_string())),
    }
}

fn parse<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, AppError> {
    serde_json::from_value(args).map_err(|e| AppError::BadArguments {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

fn to_json<T: Serialize>(value: T) -> Result<Value, AppError> {
    Ok(serde_json::to_value(value)?)
}
