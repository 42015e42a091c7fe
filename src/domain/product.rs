//! Product type and sales channel canonicalization.
//!
//! Transaction rows carry free-text product labels ingested from acquirer
//! files ("Crédito à vista", "DEBITO", "Credito 7x", ...). Margin rows are
//! keyed by a small fixed vocabulary, so every label is canonicalized before
//! any margin lookup. Matching is case-insensitive substring matching over
//! Portuguese and English labels; diacritics are not stripped, and an
//! unrecognized label falls back to `Credito`.

use serde::{Deserialize, Serialize};

/// Canonical product vocabulary used by margin configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    Debito,
    Credito,
    Credito2x,
    Credito7x,
    Voucher,
    Pix,
    Antecipacao,
}

impl ProductType {
    /// Canonicalize a raw product label.
    ///
    /// Installment sub-ranges: 2x through 6x map to `Credito2x`, 7x through
    /// 12x map to `Credito7x`. Anything credit-like without a recognizable
    /// installment marker, and any label nothing else matches, is `Credito`.
    pub fn canonicalize(raw: &str) -> Self {
        let label = raw.to_lowercase();

        if label.contains("antecip") {
            return Self::Antecipacao;
        }
        if label.contains("pix") {
            return Self::Pix;
        }
        if label.contains("voucher") {
            return Self::Voucher;
        }
        if label.contains("debit") || label.contains("débito") {
            return Self::Debito;
        }
        if label.contains("prepaid") || label.contains("pré-pago") || label.contains("pre-pago") {
            // Prepaid cards settle at the debit tier.
            return Self::Debito;
        }

        // The long range is checked first: "12x" also contains "2x".
        for n in 7..=12 {
            if label.contains(&format!("{}x", n)) {
                return Self::Credito7x;
            }
        }
        for n in 2..=6 {
            if label.contains(&format!("{}x", n)) {
                return Self::Credito2x;
            }
        }

        Self::Credito
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debito => "debito",
            Self::Credito => "credito",
            Self::Credito2x => "credito_2x",
            Self::Credito7x => "credito_7x",
            Self::Voucher => "voucher",
            Self::Pix => "pix",
            Self::Antecipacao => "antecipacao",
        }
    }
}

/// Sales channel. Anything not recognizably online is POS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Pos,
    Online,
}

impl Channel {
    pub fn canonicalize(raw: &str) -> Self {
        let label = raw.to_lowercase();
        if label.contains("online")
            || label.contains("ecommerce")
            || label.contains("e-commerce")
            || label.contains("link")
        {
            Self::Online
        } else {
            Self::Pos
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pos => "pos",
            Self::Online => "online",
        }
    }
}
