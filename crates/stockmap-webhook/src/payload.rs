//! Request bodies accepted from the admin UI and the JSON bodies sent to the
//! webhooks.
//!
//! Field names are the upstream workflow's Spanish wire names.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use stockmap_core::MutationKind;

use crate::error::PayloadError;

/// Raw mutation request as posted by the UI. Numeric fields may arrive as
/// JSON numbers or numeric strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MutationRequest {
    #[serde(default)]
    pub producto: Option<String>,
    #[serde(default)]
    pub cantidad: Option<Value>,
    #[serde(default)]
    pub tienda: Option<String>,
    #[serde(default)]
    pub stock_minimo: Option<Value>,
    #[serde(default)]
    pub stock_maximo: Option<Value>,
    #[serde(default)]
    pub tipo_operacion: Option<String>,
    #[serde(default)]
    pub usuario: Option<String>,
}

/// Create or edit body for the inventory webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpsertPayload {
    pub producto: String,
    pub cantidad: i64,
    pub tienda: String,
    pub stock_minimo: i64,
    pub stock_maximo: i64,
    pub tipo_operacion: MutationKind,
    pub usuario: String,
}

/// Delete body for the inventory webhook. `producto` is sent byte-exact so
/// upstream can match names stored with stray whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletePayload {
    pub producto: String,
    pub tipo_operacion: MutationKind,
    pub usuario: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MutationPayload {
    Upsert(UpsertPayload),
    Delete(DeletePayload),
}

impl MutationPayload {
    /// Validates `request` and builds the webhook body.
    ///
    /// `default_operator` fills `usuario` when the request leaves it blank.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError`] when `tipo_operacion` is missing or unknown,
    /// a required field is missing or blank, or a numeric field is not a
    /// non-negative whole number.
    pub fn from_request(
        request: MutationRequest,
        default_operator: &str,
    ) -> Result<Self, PayloadError> {
        let raw_kind = non_blank(request.tipo_operacion.as_deref())
            .ok_or(PayloadError::MissingField("tipo_operacion"))?;
        let kind = MutationKind::parse(raw_kind)
            .ok_or_else(|| PayloadError::UnknownOperation(raw_kind.to_string()))?;
        let usuario = non_blank(request.usuario.as_deref())
            .unwrap_or(default_operator)
            .to_string();

        if kind == MutationKind::Delete {
            let producto = request
                .producto
                .filter(|p| !p.trim().is_empty())
                .ok_or(PayloadError::MissingField("producto"))?;
            return Ok(Self::Delete(DeletePayload {
                producto,
                tipo_operacion: kind,
                usuario,
            }));
        }

        let producto = non_blank(request.producto.as_deref())
            .ok_or(PayloadError::MissingField("producto"))?
            .to_string();
        let tienda = non_blank(request.tienda.as_deref())
            .ok_or(PayloadError::MissingField("tienda"))?
            .to_string();
        let cantidad = non_negative("cantidad", request.cantidad.as_ref())?
            .ok_or(PayloadError::MissingField("cantidad"))?;
        let stock_minimo = non_negative("stock_minimo", request.stock_minimo.as_ref())?.unwrap_or(0);
        let stock_maximo = non_negative("stock_maximo", request.stock_maximo.as_ref())?.unwrap_or(0);

        Ok(Self::Upsert(UpsertPayload {
            producto,
            cantidad,
            tienda,
            stock_minimo,
            stock_maximo,
            tipo_operacion: kind,
            usuario,
        }))
    }

    #[must_use]
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::Upsert(p) => p.tipo_operacion,
            Self::Delete(p) => p.tipo_operacion,
        }
    }

    #[must_use]
    pub fn product(&self) -> &str {
        match self {
            Self::Upsert(p) => &p.producto,
            Self::Delete(p) => &p.producto,
        }
    }
}

/// Coerces a JSON number or numeric string into a whole number.
///
/// `null` and blank strings are `Ok(None)`. Floats are accepted only when
/// they have no fractional part.
///
/// # Errors
///
/// Returns [`PayloadError::InvalidNumber`] for anything else.
pub fn coerce_whole_number(field: &'static str, value: &Value) -> Result<Option<i64>, PayloadError> {
    let invalid = || PayloadError::InvalidNumber {
        field,
        value: value.to_string(),
    };
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(Some(i)),
            None => n.as_f64().and_then(whole_f64).map(Some).ok_or_else(invalid),
        },
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            if let Ok(i) = s.parse::<i64>() {
                return Ok(Some(i));
            }
            s.parse::<f64>()
                .ok()
                .and_then(whole_f64)
                .map(Some)
                .ok_or_else(invalid)
        }
        _ => Err(invalid()),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn whole_f64(f: f64) -> Option<i64> {
    // i64::MAX is not exactly representable; stay strictly inside the range.
    (f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e18).then(|| f as i64)
}

fn non_negative(field: &'static str, value: Option<&Value>) -> Result<Option<i64>, PayloadError> {
    let Some(value) = value else {
        return Ok(None);
    };
    match coerce_whole_number(field, value)? {
        Some(n) if n < 0 => Err(PayloadError::Negative { field }),
        other => Ok(other),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Body of `POST /api/dictionary/product`, forwarded unchanged once valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDictionaryRequest {
    #[serde(default)]
    pub producto_existente: String,
}

impl ProductDictionaryRequest {
    /// # Errors
    ///
    /// Returns [`PayloadError::MissingField`] when `producto_existente` is blank.
    pub fn validate(self) -> Result<Self, PayloadError> {
        let producto_existente = self.producto_existente.trim().to_string();
        if producto_existente.is_empty() {
            return Err(PayloadError::MissingField("producto_existente"));
        }
        Ok(Self { producto_existente })
    }
}

/// Body of `POST /api/dictionary/combo`, forwarded once valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboDictionaryRequest {
    #[serde(default)]
    pub combo_existente: String,
    #[serde(default)]
    pub combo_nuevo: Vec<String>,
}

impl ComboDictionaryRequest {
    /// Trims every field and drops blank members.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::MissingField`] when the combo name is blank or
    /// no non-blank member remains.
    pub fn validate(self) -> Result<Self, PayloadError> {
        let combo_existente = self.combo_existente.trim().to_string();
        if combo_existente.is_empty() {
            return Err(PayloadError::MissingField("combo_existente"));
        }
        let combo_nuevo: Vec<String> = self
            .combo_nuevo
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if combo_nuevo.is_empty() {
            return Err(PayloadError::MissingField("combo_nuevo"));
        }
        Ok(Self {
            combo_existente,
            combo_nuevo,
        })
    }
}

/// Mirror body for a saved single-product mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDictionaryPayload {
    pub producto_existente: String,
    pub producto_nuevo: String,
}

/// Mirror body for a saved combo mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComboDictionaryPayload {
    pub nombre_combo: String,
    pub productos_combo: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request(value: Value) -> MutationRequest {
        serde_json::from_value(value).expect("request should deserialize")
    }

    #[test]
    fn create_trims_names_and_coerces_strings() {
        let payload = MutationPayload::from_request(
            request(json!({
                "producto": "  GEL PYTHON ",
                "cantidad": "12",
                "tienda": " Centro ",
                "stock_minimo": 2,
                "stock_maximo": "20.0",
                "tipo_operacion": "nuevo",
                "usuario": "ana"
            })),
            "admin",
        )
        .unwrap();

        assert_eq!(
            payload,
            MutationPayload::Upsert(UpsertPayload {
                producto: "GEL PYTHON".to_string(),
                cantidad: 12,
                tienda: "Centro".to_string(),
                stock_minimo: 2,
                stock_maximo: 20,
                tipo_operacion: MutationKind::Create,
                usuario: "ana".to_string(),
            })
        );
    }

    #[test]
    fn delete_keeps_product_byte_exact() {
        let payload = MutationPayload::from_request(
            request(json!({ "producto": "  GEL PYTHON  ", "tipo_operacion": "eliminar" })),
            "admin",
        )
        .unwrap();
        assert_eq!(payload.product(), "  GEL PYTHON  ");
        assert_eq!(payload.kind(), MutationKind::Delete);

        let body = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            body,
            json!({ "producto": "  GEL PYTHON  ", "tipo_operacion": "eliminar", "usuario": "admin" })
        );
    }

    #[test]
    fn edit_serializes_wire_names() {
        let payload = MutationPayload::from_request(
            request(json!({
                "producto": "A", "cantidad": 1, "tienda": "T", "tipo_operacion": "editar"
            })),
            "admin",
        )
        .unwrap();
        let body = serde_json::to_value(&payload).unwrap();
        assert_eq!(body["tipo_operacion"], "editar");
        assert_eq!(body["stock_minimo"], 0);
        assert_eq!(body["usuario"], "admin");
    }

    #[test]
    fn missing_fields_are_reported() {
        let err = MutationPayload::from_request(request(json!({ "producto": "A" })), "admin")
            .unwrap_err();
        assert_eq!(err, PayloadError::MissingField("tipo_operacion"));

        let err = MutationPayload::from_request(
            request(json!({ "producto": "A", "cantidad": 1, "tipo_operacion": "nuevo" })),
            "admin",
        )
        .unwrap_err();
        assert_eq!(err, PayloadError::MissingField("tienda"));

        let err = MutationPayload::from_request(
            request(json!({ "producto": "   ", "tipo_operacion": "eliminar" })),
            "admin",
        )
        .unwrap_err();
        assert_eq!(err, PayloadError::MissingField("producto"));
    }

    #[test]
    fn unknown_operation_is_rejected() {
        let err = MutationPayload::from_request(
            request(json!({ "producto": "A", "tipo_operacion": "archivar" })),
            "admin",
        )
        .unwrap_err();
        assert_eq!(err, PayloadError::UnknownOperation("archivar".to_string()));
    }

    #[test]
    fn negative_and_fractional_quantities_are_rejected() {
        let err = MutationPayload::from_request(
            request(json!({ "producto": "A", "tienda": "T", "cantidad": -1, "tipo_operacion": "nuevo" })),
            "admin",
        )
        .unwrap_err();
        assert_eq!(err, PayloadError::Negative { field: "cantidad" });

        let err = MutationPayload::from_request(
            request(json!({ "producto": "A", "tienda": "T", "cantidad": "1.5", "tipo_operacion": "nuevo" })),
            "admin",
        )
        .unwrap_err();
        assert!(matches!(err, PayloadError::InvalidNumber { field: "cantidad", .. }));
    }

    #[test]
    fn coercion_edge_cases() {
        assert_eq!(coerce_whole_number("n", &json!(null)), Ok(None));
        assert_eq!(coerce_whole_number("n", &json!("  ")), Ok(None));
        assert_eq!(coerce_whole_number("n", &json!(" 7 ")), Ok(Some(7)));
        assert_eq!(coerce_whole_number("n", &json!(3.0)), Ok(Some(3)));
        assert!(coerce_whole_number("n", &json!("abc")).is_err());
        assert!(coerce_whole_number("n", &json!(true)).is_err());
    }

    #[test]
    fn dictionary_requests_validate_and_trim() {
        let product = ProductDictionaryRequest {
            producto_existente: " GEL ".to_string(),
        }
        .validate()
        .unwrap();
        assert_eq!(product.producto_existente, "GEL");

        assert_eq!(
            ProductDictionaryRequest::default().validate(),
            Err(PayloadError::MissingField("producto_existente"))
        );

        let combo = ComboDictionaryRequest {
            combo_existente: "Kit".to_string(),
            combo_nuevo: vec![" A ".to_string(), String::new()],
        }
        .validate()
        .unwrap();
        assert_eq!(combo.combo_nuevo, vec!["A".to_string()]);

        assert_eq!(
            ComboDictionaryRequest {
                combo_existente: "Kit".to_string(),
                combo_nuevo: vec!["  ".to_string()],
            }
            .validate(),
            Err(PayloadError::MissingField("combo_nuevo"))
        );
    }
}
