//! Closed enumerations for the string-typed kinds the upstream tables and
//! webhooks use. Each maps exhaustively to a display label; unknown upstream
//! strings parse to `None` instead of failing.

use serde::{Deserialize, Serialize};

/// The `tipo_operacion` sent to the inventory webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationKind {
    #[serde(rename = "nuevo")]
    Create,
    #[serde(rename = "editar")]
    Edit,
    #[serde(rename = "eliminar")]
    Delete,
}

impl MutationKind {
    #[must_use]
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Create => "nuevo",
            Self::Edit => "editar",
            Self::Delete => "eliminar",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Create => "Create product",
            Self::Edit => "Edit product",
            Self::Delete => "Delete product",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "nuevo" | "create" => Some(Self::Create),
            "editar" | "edit" => Some(Self::Edit),
            "eliminar" | "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Accepts both the English and the Spanish spellings found in order rows.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "pending" | "pendiente" => Some(Self::Pending),
            "processing" | "procesando" | "en proceso" => Some(Self::Processing),
            "shipped" | "enviado" => Some(Self::Shipped),
            "delivered" | "entregado" => Some(Self::Delivered),
            "cancelled" | "canceled" | "cancelado" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    CashOnDelivery,
}

impl PaymentMethod {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Card => "Card",
            Self::Transfer => "Bank transfer",
            Self::CashOnDelivery => "Cash on delivery",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "cash" | "efectivo" => Some(Self::Cash),
            "card" | "tarjeta" => Some(Self::Card),
            "transfer" | "transferencia" => Some(Self::Transfer),
            "cash_on_delivery" | "cash on delivery" | "contra entrega" | "contraentrega" => {
                Some(Self::CashOnDelivery)
            }
            _ => None,
        }
    }
}
