//! Request handlers

use crate::protocol::{RpcError, RpcRequest, RpcResponse};
use crate::settings::Settings;
use convext::json::{json_to_value, value_to_json};
use convext::{Convext, Schema, Traced};
use convext_core::{DateTime, DateTimeOffset, DeclaredType, TypeKind, Value};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value as JsonValue};
use std::collections::BTreeMap;
use tracing::debug;

const SERVER_NAME: &str = "convext";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Deserialize)]
struct EncodeParams {
    converter: String,
    #[serde(rename = "type")]
    declared: String,
    #[serde(default)]
    value: JsonValue,
}

#[derive(Debug, Deserialize)]
struct DecodeParams {
    converter: String,
    #[serde(rename = "type")]
    declared: String,
    #[serde(default)]
    json: JsonValue,
    #[serde(default)]
    existing: Option<JsonValue>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Container {
    List,
    Map,
}

#[derive(Debug, Deserialize)]
struct DocumentParams {
    converter: String,
    #[serde(rename = "type")]
    declared: String,
    container: Container,
    #[serde(default)]
    value: JsonValue,
    #[serde(default)]
    json: JsonValue,
}

pub fn handle_request(convext: &Convext, settings: &Settings, request: &RpcRequest) -> RpcResponse {
    debug!(method = %request.method, "handling request");
    let result = match request.method.as_str() {
        "ping" => Ok(json!({ "name": SERVER_NAME, "version": SERVER_VERSION })),
        "converters/list" => Ok(json!({ "converters": convext.registry().list() })),
        "encode" => params(request).and_then(|p| handle_encode(convext, settings, p)),
        "decode" => params(request).and_then(|p| handle_decode(convext, settings, p)),
        "document/serialize" => params(request).and_then(|p| handle_document_serialize(convext, settings, p)),
        "document/deserialize" => {
            params(request).and_then(|p| handle_document_deserialize(convext, settings, p))
        }
        _ => Err(RpcError::method_not_found(&request.method)),
    };
    RpcResponse::new(request.id.clone(), result)
}

fn params<T: DeserializeOwned>(request: &RpcRequest) -> Result<T, RpcError> {
    let raw = request.params.clone().unwrap_or_else(|| json!({}));
    serde_json::from_value(raw).map_err(|e| RpcError::invalid_params(format!("Invalid params: {}", e)))
}

fn declared_type(s: &str) -> Result<DeclaredType, RpcError> {
    s.parse().map_err(|e: convext_core::TypeParseError| RpcError::invalid_params(e.to_string()))
}

/// Host value from request JSON. Date-typed strings are read as ISO-8601.
fn host_value(json: &JsonValue, declared: &DeclaredType) -> Result<Value, RpcError> {
    let invalid = |s: &str, e: convext_core::DateTimeError| {
        RpcError::invalid_params(format!("Invalid date '{}': {}", s, e))
    };
    match (declared.kind(), json) {
        (TypeKind::DateTime, JsonValue::String(s)) => {
            DateTime::parse(s).map(Value::DateTime).map_err(|e| invalid(s.as_str(), e))
        }
        (TypeKind::DateTimeOffset, JsonValue::String(s)) => {
            DateTimeOffset::parse(s).map(Value::DateTimeOffset).map_err(|e| invalid(s.as_str(), e))
        }
        _ => Ok(json_to_value(json)),
    }
}

fn finish(settings: &Settings, key: &str, traced: Traced<JsonValue>) -> Result<JsonValue, RpcError> {
    match traced.result {
        Ok(output) => {
            let mut body = Map::new();
            body.insert(key.to_string(), output);
            if settings.trace {
                body.insert("trace".to_string(), json!(traced.trace));
            }
            Ok(JsonValue::Object(body))
        }
        Err(e) => {
            let mut err = RpcError::conversion(&e);
            if settings.trace {
                if let Some(data) = err.data.as_mut() {
                    data["trace"] = json!(traced.trace);
                }
            }
            Err(err)
        }
    }
}

fn to_json(traced: Traced<Value>) -> Traced<JsonValue> {
    Traced {
        result: traced.result.map(|v| value_to_json(&v)),
        trace: traced.trace,
    }
}

fn handle_encode(convext: &Convext, settings: &Settings, p: EncodeParams) -> Result<JsonValue, RpcError> {
    let declared = declared_type(&p.declared)?;
    let value = host_value(&p.value, &declared)?;
    let schema = Schema::converted(declared, p.converter);
    finish(settings, "json", convext.serialize_traced(&value, &schema))
}

fn handle_decode(convext: &Convext, settings: &Settings, p: DecodeParams) -> Result<JsonValue, RpcError> {
    let declared = declared_type(&p.declared)?;
    let existing = p
        .existing
        .as_ref()
        .map(|e| host_value(e, &declared))
        .transpose()?;
    let schema = Schema::converted(declared, p.converter);
    let traced = convext.deserialize_traced(&p.json, &schema, existing.as_ref());
    finish(settings, "value", to_json(traced))
}

fn document_schema(p: &DocumentParams, declared: DeclaredType) -> Schema {
    let item = Schema::converted(declared, p.converter.clone());
    match p.container {
        Container::List => Schema::list(item),
        Container::Map => Schema::map(item),
    }
}

fn handle_document_serialize(
    convext: &Convext,
    settings: &Settings,
    p: DocumentParams,
) -> Result<JsonValue, RpcError> {
    let declared = declared_type(&p.declared)?;
    let value = match (&p.container, &p.value) {
        (Container::List, JsonValue::Array(items)) => Value::List(
            items
                .iter()
                .map(|j| host_value(j, &declared))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        (Container::Map, JsonValue::Object(entries)) => Value::Object(
            entries
                .iter()
                .map(|(k, j)| host_value(j, &declared).map(|v| (k.clone(), v)))
                .collect::<Result<BTreeMap<_, _>, _>>()?,
        ),
        (Container::List, _) => return Err(RpcError::invalid_params("value must be an array")),
        (Container::Map, _) => return Err(RpcError::invalid_params("value must be an object")),
    };
    let schema = document_schema(&p, declared);
    finish(settings, "json", convext.serialize_traced(&value, &schema))
}

fn handle_document_deserialize(
    convext: &Convext,
    settings: &Settings,
    p: DocumentParams,
) -> Result<JsonValue, RpcError> {
    let declared = declared_type(&p.declared)?;
    let schema = document_schema(&p, declared);
    let traced = convext.deserialize_traced(&p.json, &schema, None);
    finish(settings, "value", to_json(traced))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{CONVERSION_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND};

    fn call(method: &str, params: JsonValue) -> RpcResponse {
        call_with(&Settings::default(), method, params)
    }

    fn call_with(settings: &Settings, method: &str, params: JsonValue) -> RpcResponse {
        let request = RpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(json!(1)),
            method: method.to_string(),
            params: Some(params),
        };
        handle_request(&Convext::with_standard_converters().with_tracing(settings.trace), settings, &request)
    }

    fn result(response: RpcResponse) -> JsonValue {
        match (response.result, response.error) {
            (Some(r), None) => r,
            (_, e) => panic!("expected result, got error {:?}", e),
        }
    }

    fn error(response: RpcResponse) -> RpcError {
        match response.error {
            Some(e) => e,
            None => panic!("expected error, got {:?}", response.result),
        }
    }

    #[test]
    fn test_ping() {
        let r = result(call("ping", json!({})));
        assert_eq!(r["name"], "convext");
    }

    #[test]
    fn test_converters_list() {
        let r = result(call("converters/list", json!({})));
        let names: Vec<&str> = r["converters"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|c| c["name"].as_str())
            .collect();
        assert_eq!(names, vec!["StringTrim", "UnixMillis"]);
    }

    #[test]
    fn test_encode() {
        let r = result(call(
            "encode",
            json!({"converter": "UnixMillis", "type": "DateTimeOffset", "value": "2018-01-01T16:01:16.155-05:00"}),
        ));
        assert_eq!(r, json!({"json": 1514840476155i64}));

        let r = result(call("encode", json!({"converter": "stringtrim", "type": "String", "value": " String! "})));
        assert_eq!(r, json!({"json": "String!"}));
    }

    #[test]
    fn test_decode() {
        let r = result(call(
            "decode",
            json!({"converter": "UnixMillis", "type": "DateTimeOffset", "json": "1514840476147"}),
        ));
        assert_eq!(r, json!({"value": "2018-01-01T21:01:16.147+00:00"}));

        let r = result(call("decode", json!({"converter": "UnixMillis", "type": "DateTime?", "json": null})));
        assert_eq!(r, json!({"value": null}));

        let r = result(call(
            "decode",
            json!({"converter": "StringTrim", "type": "String", "json": " String! ", "existing": " Existing! "}),
        ));
        assert_eq!(r, json!({"value": "String!Existing!"}));
    }

    #[test]
    fn test_decode_domain_error() {
        let e = error(call("decode", json!({"converter": "UnixMillis", "type": "DateTime", "json": false})));
        assert_eq!(e.code, CONVERSION_ERROR);
        assert_eq!(
            e.message,
            "Unexpected token parsing date. Expected Integer or String, got Boolean. Path ''."
        );
        assert_eq!(e.data, Some(json!({"code": "UNEXPECTED_TOKEN"})));
    }

    #[test]
    fn test_document_round_trip() {
        let r = result(call(
            "document/serialize",
            json!({
                "converter": "UnixMillis",
                "type": "DateTime",
                "container": "list",
                "value": ["2018-01-01T21:01:16.149Z", "1970-01-01T00:00:03.789Z"]
            }),
        ));
        assert_eq!(r, json!({"json": [1514840476149i64, 3789]}));

        let r = result(call(
            "document/deserialize",
            json!({"converter": "UnixMillis", "type": "DateTime", "container": "map", "json": {"First": 3754, "Second": 1514840476125i64}}),
        ));
        assert_eq!(
            r,
            json!({"value": {"First": "1970-01-01T00:00:03.754Z", "Second": "2018-01-01T21:01:16.125Z"}})
        );
    }

    #[test]
    fn test_any_typed_strings_stay_strings() {
        // Untyped slots hand plain strings to the converter
        let e = error(call(
            "encode",
            json!({"converter": "UnixMillis", "type": "Any", "value": "2018-01-01T00:00:00Z"}),
        ));
        assert_eq!(e.message, "Expected date object value. Path ''.");
    }

    #[test]
    fn test_trace_in_response() {
        let settings = Settings { trace: true, ..Settings::default() };
        let r = result(call_with(
            &settings,
            "document/deserialize",
            json!({"converter": "UnixMillis", "type": "DateTime", "container": "list", "json": [0]}),
        ));
        assert_eq!(r["trace"][0]["path"], "[0]");
        assert_eq!(r["trace"][0]["direction"], "read");

        let e = error(call_with(
            &settings,
            "encode",
            json!({"converter": "UnixMillis", "type": "DateTime", "value": "1969-12-31T23:59:59Z"}),
        ));
        let data = e.data.unwrap();
        assert_eq!(data["code"], "PRE_EPOCH_VALUE");
        assert_eq!(data["trace"][0]["ok"], false);
    }

    #[test]
    fn test_invalid_params() {
        let e = error(call("encode", json!({"converter": "UnixMillis"})));
        assert_eq!(e.code, INVALID_PARAMS);

        let e = error(call("encode", json!({"converter": "UnixMillis", "type": "Instant", "value": 0})));
        assert_eq!(e.code, INVALID_PARAMS);

        let e = error(call("encode", json!({"converter": "UnixMillis", "type": "DateTime", "value": "soon"})));
        assert_eq!(e.code, INVALID_PARAMS);

        let e = error(call(
            "document/serialize",
            json!({"converter": "UnixMillis", "type": "DateTime", "container": "list", "value": {}}),
        ));
        assert_eq!(e.message, "value must be an array");

        let e = error(call(
            "document/serialize",
            json!({"converter": "UnixMillis", "type": "DateTime", "container": "set", "value": []}),
        ));
        assert_eq!(e.code, INVALID_PARAMS);
    }

    #[test]
    fn test_unknown_converter_is_conversion_error() {
        let e = error(call("encode", json!({"converter": "Iso", "type": "DateTime", "value": "2018-01-01T00:00:00Z"})));
        assert_eq!(e.code, CONVERSION_ERROR);
        assert_eq!(e.data, Some(json!({"code": "UNKNOWN_CONVERTER"})));
    }

    #[test]
    fn test_unknown_method() {
        let e = error(call("tools/list", json!({})));
        assert_eq!(e.code, METHOD_NOT_FOUND);
        assert_eq!(e.message, "Method not found: tools/list");
    }
}
