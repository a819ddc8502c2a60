//! Target field registries for the importable record types
//!
//! Each record type declares its canonical fields, the header spellings
//! third-party exports use for them, and the coercion to apply to mapped
//! cells. The tables are process-wide constants, but the pipeline only ever
//! sees them through an injected `ImportSpec`, so tests can substitute
//! their own.

use std::fmt;
use std::str::FromStr;

use chrono::Local;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::result::Error;
use crate::domain::value::{date_from_serial, parse_date, parse_decimal, CellValue};

/// One canonical field an import can populate
#[derive(Debug, Clone, Serialize)]
pub struct TargetField {
    /// Canonical key, as stored in the datastore record
    pub field: &'static str,
    /// Display name shown in mapping and validation output
    pub label: &'static str,
    pub required: bool,
}

/// Known third-party header spellings for a target field, plus the
/// coercion applied to cells mapped to it
#[derive(Debug, Clone, Serialize)]
pub struct AliasEntry {
    pub target_field: &'static str,
    pub aliases: &'static [&'static str],
    pub transform: Option<Transform>,
}

/// A named total coercion
///
/// Every variant returns a best-effort value for any input and never
/// fails: unparseable numbers become 0, unparseable dates become today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transform {
    Trim,
    Uppercase,
    Decimal,
    Date,
}

impl Transform {
    /// Apply the coercion to a raw cell
    pub fn apply(&self, value: &CellValue) -> CellValue {
        match self {
            Transform::Trim => CellValue::text(value.render().trim()),
            Transform::Uppercase => CellValue::text(value.render().trim().to_uppercase()),
            Transform::Decimal => match value {
                CellValue::Number(n) => CellValue::Number(*n),
                other => CellValue::Number(
                    parse_decimal(&other.render()).unwrap_or(Decimal::ZERO),
                ),
            },
            Transform::Date => {
                let parsed = match value {
                    CellValue::Number(n) => date_from_serial(*n),
                    other => parse_date(&other.render()),
                };
                let date = parsed.unwrap_or_else(|| Local::now().date_naive());
                CellValue::Text(date.format("%Y-%m-%d").to_string())
            }
        }
    }
}

/// The import configuration for one record type
#[derive(Debug, Clone, Serialize)]
pub struct ImportSpec {
    /// Datastore collection the imported records land in
    pub collection: &'static str,
    pub fields: &'static [TargetField],
    pub aliases: &'static [AliasEntry],
}

impl ImportSpec {
    /// Look up a target field by canonical key
    pub fn field(&self, name: &str) -> Option<&'static TargetField> {
        self.fields.iter().find(|f| f.field == name)
    }

    /// Fields that must be mapped and non-empty for a row to import
    pub fn required_fields(&self) -> Vec<&'static TargetField> {
        self.fields.iter().filter(|f| f.required).collect()
    }

    /// Display label for a field key, falling back to the key itself
    pub fn label_for<'a>(&self, field: &'a str) -> &'a str {
        self.field(field).map(|f| f.label).unwrap_or(field)
    }

    /// Registered coercion for a field, if any
    pub fn transform_for(&self, field: &str) -> Option<Transform> {
        self.aliases
            .iter()
            .find(|a| a.target_field == field)
            .and_then(|a| a.transform)
    }

    /// Known header spellings for a field
    pub fn aliases_for(&self, field: &str) -> &'static [&'static str] {
        self.aliases
            .iter()
            .find(|a| a.target_field == field)
            .map(|a| a.aliases)
            .unwrap_or(&[])
    }
}

/// Record types the application can import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Customers,
    Vendors,
    Items,
    Invoices,
    InvoiceLines,
}

impl Entity {
    pub const ALL: [Entity; 5] = [
        Entity::Customers,
        Entity::Vendors,
        Entity::Items,
        Entity::Invoices,
        Entity::InvoiceLines,
    ];

    /// Datastore collection name
    pub fn collection(&self) -> &'static str {
        match self {
            Entity::Customers => "customers",
            Entity::Vendors => "vendors",
            Entity::Items => "items",
            Entity::Invoices => "invoices",
            Entity::InvoiceLines => "invoice_lines",
        }
    }

    /// Built-in import registry for this record type
    pub fn spec(&self) -> &'static ImportSpec {
        match self {
            Entity::Customers => &CUSTOMERS,
            Entity::Vendors => &VENDORS,
            Entity::Items => &ITEMS,
            Entity::Invoices => &INVOICES,
            Entity::InvoiceLines => &INVOICE_LINES,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.collection())
    }
}

impl FromStr for Entity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "customers" | "customer" => Ok(Entity::Customers),
            "vendors" | "vendor" | "suppliers" => Ok(Entity::Vendors),
            "items" | "item" | "products" => Ok(Entity::Items),
            "invoices" | "invoice" => Ok(Entity::Invoices),
            "invoice_lines" | "invoice-lines" | "lines" => Ok(Entity::InvoiceLines),
            other => Err(Error::validation(format!("Unknown entity type: {}", other))),
        }
    }
}

// =============================================================================
// Built-in registries
//
// Declaration order matters: the auto-mapper binds an ambiguous header to
// the first field whose key, label, or alias matches.
// =============================================================================

const CUSTOMER_FIELDS: &[TargetField] = &[
    TargetField { field: "name", label: "Name", required: true },
    TargetField { field: "email", label: "Email", required: false },
    TargetField { field: "phone", label: "Phone", required: false },
    TargetField { field: "gstin", label: "GSTIN", required: false },
    TargetField { field: "billing_address", label: "Billing Address", required: false },
    TargetField { field: "city", label: "City", required: false },
    TargetField { field: "state", label: "State", required: false },
    TargetField { field: "pincode", label: "Pincode", required: false },
    TargetField { field: "opening_balance", label: "Opening Balance", required: false },
];

const CUSTOMER_ALIASES: &[AliasEntry] = &[
    AliasEntry {
        target_field: "name",
        aliases: &["customer name", "customer", "client", "party", "party name", "account name"],
        transform: Some(Transform::Trim),
    },
    AliasEntry {
        target_field: "email",
        aliases: &["email address", "e-mail", "mail", "email id"],
        transform: None,
    },
    AliasEntry {
        target_field: "phone",
        aliases: &["phone number", "phone no", "mobile", "mobile number", "mobile no", "contact", "contact number"],
        transform: Some(Transform::Trim),
    },
    AliasEntry {
        target_field: "gstin",
        aliases: &["gst", "gst number", "gst no", "gstin/uin", "tax id", "tin", "vat no"],
        transform: Some(Transform::Uppercase),
    },
    AliasEntry {
        target_field: "billing_address",
        aliases: &["address", "addr", "street", "address line 1", "billing addr"],
        transform: None,
    },
    AliasEntry {
        target_field: "city",
        aliases: &["town", "district"],
        transform: None,
    },
    AliasEntry {
        target_field: "state",
        aliases: &["province", "region"],
        transform: None,
    },
    AliasEntry {
        target_field: "pincode",
        aliases: &["pin code", "pin", "zip", "zip code", "postal code", "postcode"],
        transform: Some(Transform::Trim),
    },
    AliasEntry {
        target_field: "opening_balance",
        aliases: &["opening bal", "balance", "outstanding"],
        transform: Some(Transform::Decimal),
    },
];

const VENDOR_FIELDS: &[TargetField] = &[
    TargetField { field: "name", label: "Name", required: true },
    TargetField { field: "email", label: "Email", required: false },
    TargetField { field: "phone", label: "Phone", required: false },
    TargetField { field: "gstin", label: "GSTIN", required: false },
    TargetField { field: "billing_address", label: "Billing Address", required: false },
    TargetField { field: "city", label: "City", required: false },
    TargetField { field: "state", label: "State", required: false },
    TargetField { field: "pincode", label: "Pincode", required: false },
    TargetField { field: "opening_balance", label: "Opening Balance", required: false },
];

const VENDOR_ALIASES: &[AliasEntry] = &[
    AliasEntry {
        target_field: "name",
        aliases: &["vendor name", "vendor", "supplier", "supplier name", "party", "party name", "company", "company name"],
        transform: Some(Transform::Trim),
    },
    AliasEntry {
        target_field: "email",
        aliases: &["email address", "e-mail", "mail", "email id"],
        transform: None,
    },
    AliasEntry {
        target_field: "phone",
        aliases: &["phone number", "phone no", "mobile", "mobile number", "mobile no", "contact", "contact number"],
        transform: Some(Transform::Trim),
    },
    AliasEntry {
        target_field: "gstin",
        aliases: &["gst", "gst number", "gst no", "gstin/uin", "tax id", "tin", "vat no"],
        transform: Some(Transform::Uppercase),
    },
    AliasEntry {
        target_field: "billing_address",
        aliases: &["address", "addr", "street", "address line 1", "billing addr"],
        transform: None,
    },
    AliasEntry {
        target_field: "city",
        aliases: &["town", "district"],
        transform: None,
    },
    AliasEntry {
        target_field: "state",
        aliases: &["province", "region"],
        transform: None,
    },
    AliasEntry {
        target_field: "pincode",
        aliases: &["pin code", "pin", "zip", "zip code", "postal code", "postcode"],
        transform: Some(Transform::Trim),
    },
    AliasEntry {
        target_field: "opening_balance",
        aliases: &["opening bal", "balance", "payable", "outstanding"],
        transform: Some(Transform::Decimal),
    },
];

const ITEM_FIELDS: &[TargetField] = &[
    TargetField { field: "name", label: "Name", required: true },
    TargetField { field: "description", label: "Description", required: false },
    TargetField { field: "unit", label: "Unit", required: false },
    TargetField { field: "selling_price", label: "Selling Price", required: false },
    TargetField { field: "purchase_price", label: "Purchase Price", required: false },
    TargetField { field: "tax_rate", label: "Tax Rate", required: false },
    TargetField { field: "hsn_code", label: "HSN Code", required: false },
    TargetField { field: "stock", label: "Stock", required: false },
];

const ITEM_ALIASES: &[AliasEntry] = &[
    AliasEntry {
        target_field: "name",
        aliases: &["item name", "item", "product", "product name", "goods"],
        transform: Some(Transform::Trim),
    },
    AliasEntry {
        target_field: "description",
        aliases: &["desc", "details", "remarks"],
        transform: None,
    },
    AliasEntry {
        target_field: "unit",
        aliases: &["uom", "units", "measure", "per"],
        transform: Some(Transform::Trim),
    },
    AliasEntry {
        target_field: "selling_price",
        aliases: &["sale price", "sales rate", "mrp"],
        transform: Some(Transform::Decimal),
    },
    AliasEntry {
        target_field: "purchase_price",
        aliases: &["cost price", "cost", "buy price", "purchase rate"],
        transform: Some(Transform::Decimal),
    },
    AliasEntry {
        target_field: "tax_rate",
        aliases: &["tax", "gst", "gst rate", "tax %", "gst %"],
        transform: Some(Transform::Decimal),
    },
    AliasEntry {
        target_field: "hsn_code",
        aliases: &["hsn", "sac", "hsn/sac", "hsn sac"],
        transform: Some(Transform::Uppercase),
    },
    AliasEntry {
        target_field: "stock",
        aliases: &["opening stock", "qty", "quantity", "on hand", "stock qty"],
        transform: Some(Transform::Decimal),
    },
];

const INVOICE_FIELDS: &[TargetField] = &[
    TargetField { field: "invoice_number", label: "Invoice Number", required: true },
    TargetField { field: "customer", label: "Customer", required: true },
    TargetField { field: "date", label: "Date", required: true },
    TargetField { field: "due_date", label: "Due Date", required: false },
    TargetField { field: "total", label: "Total", required: false },
    TargetField { field: "status", label: "Status", required: false },
    TargetField { field: "notes", label: "Notes", required: false },
];

const INVOICE_ALIASES: &[AliasEntry] = &[
    AliasEntry {
        target_field: "invoice_number",
        aliases: &["invoice no", "inv no", "bill no", "invoice #", "voucher no"],
        transform: Some(Transform::Trim),
    },
    AliasEntry {
        target_field: "customer",
        aliases: &["customer name", "party", "client", "billed to", "buyer"],
        transform: Some(Transform::Trim),
    },
    AliasEntry {
        target_field: "date",
        aliases: &["invoice date", "bill date", "txn date", "transaction date"],
        transform: Some(Transform::Date),
    },
    AliasEntry {
        target_field: "due_date",
        aliases: &["due", "payment due", "due on"],
        transform: Some(Transform::Date),
    },
    AliasEntry {
        target_field: "total",
        aliases: &["amount", "grand total", "invoice amount", "net amount", "invoice total", "total amount"],
        transform: Some(Transform::Decimal),
    },
    AliasEntry {
        target_field: "status",
        aliases: &["payment status", "paid"],
        transform: Some(Transform::Trim),
    },
    AliasEntry {
        target_field: "notes",
        aliases: &["remarks", "memo", "narration", "comments"],
        transform: None,
    },
];

const INVOICE_LINE_FIELDS: &[TargetField] = &[
    TargetField { field: "invoice_number", label: "Invoice Number", required: true },
    TargetField { field: "item", label: "Item", required: true },
    TargetField { field: "quantity", label: "Quantity", required: false },
    TargetField { field: "rate", label: "Rate", required: false },
    TargetField { field: "amount", label: "Amount", required: false },
    TargetField { field: "tax_rate", label: "Tax Rate", required: false },
];

const INVOICE_LINE_ALIASES: &[AliasEntry] = &[
    AliasEntry {
        target_field: "invoice_number",
        aliases: &["invoice no", "inv no", "bill no", "voucher no"],
        transform: Some(Transform::Trim),
    },
    AliasEntry {
        target_field: "item",
        aliases: &["item name", "product", "goods", "particulars", "description of goods"],
        transform: Some(Transform::Trim),
    },
    AliasEntry {
        target_field: "quantity",
        aliases: &["qty", "nos", "pcs"],
        transform: Some(Transform::Decimal),
    },
    AliasEntry {
        target_field: "rate",
        aliases: &["price", "unit price"],
        transform: Some(Transform::Decimal),
    },
    AliasEntry {
        target_field: "amount",
        aliases: &["line total", "value", "taxable value"],
        transform: Some(Transform::Decimal),
    },
    AliasEntry {
        target_field: "tax_rate",
        aliases: &["tax", "gst rate", "tax %", "gst %", "igst", "cgst", "sgst"],
        transform: Some(Transform::Decimal),
    },
];

static CUSTOMERS: ImportSpec = ImportSpec {
    collection: "customers",
    fields: CUSTOMER_FIELDS,
    aliases: CUSTOMER_ALIASES,
};

static VENDORS: ImportSpec = ImportSpec {
    collection: "vendors",
    fields: VENDOR_FIELDS,
    aliases: VENDOR_ALIASES,
};

static ITEMS: ImportSpec = ImportSpec {
    collection: "items",
    fields: ITEM_FIELDS,
    aliases: ITEM_ALIASES,
};

static INVOICES: ImportSpec = ImportSpec {
    collection: "invoices",
    fields: INVOICE_FIELDS,
    aliases: INVOICE_ALIASES,
};

static INVOICE_LINES: ImportSpec = ImportSpec {
    collection: "invoice_lines",
    fields: INVOICE_LINE_FIELDS,
    aliases: INVOICE_LINE_ALIASES,
};
