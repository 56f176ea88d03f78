//! Authority rule tables: voucher types, concepts, document types,
//! VAT aliquots and receiver VAT conditions.
//!
//! Every table is a closed enum serialised as its bare numeric code, so
//! a friendly request carrying an unknown code fails to decode instead of
//! reaching the authority.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::error::FacturaError;

/// Letter class of a voucher. Determines which receivers may be invoiced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoucherClass {
    A,
    B,
    C,
}

/// What a voucher does to the receiver's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoucherKind {
    Invoice,
    DebitNote,
    CreditNote,
}

/// Voucher (comprobante) type codes accepted by the WSFE service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum VoucherType {
    /// 1: Factura A.
    InvoiceA,
    /// 2: Nota de Débito A.
    DebitNoteA,
    /// 3: Nota de Crédito A.
    CreditNoteA,
    /// 6: Factura B.
    InvoiceB,
    /// 7: Nota de Débito B.
    DebitNoteB,
    /// 8: Nota de Crédito B.
    CreditNoteB,
    /// 11: Factura C.
    InvoiceC,
    /// 12: Nota de Débito C.
    DebitNoteC,
    /// 13: Nota de Crédito C.
    CreditNoteC,
    /// 201: Factura de Crédito Electrónica MiPyME A.
    MipymeInvoiceA,
    /// 202: Nota de Débito Electrónica MiPyME A.
    MipymeDebitNoteA,
    /// 203: Nota de Crédito Electrónica MiPyME A.
    MipymeCreditNoteA,
    /// 206: Factura de Crédito Electrónica MiPyME B.
    MipymeInvoiceB,
    /// 207: Nota de Débito Electrónica MiPyME B.
    MipymeDebitNoteB,
    /// 208: Nota de Crédito Electrónica MiPyME B.
    MipymeCreditNoteB,
    /// 211: Factura de Crédito Electrónica MiPyME C.
    MipymeInvoiceC,
    /// 212: Nota de Débito Electrónica MiPyME C.
    MipymeDebitNoteC,
    /// 213: Nota de Crédito Electrónica MiPyME C.
    MipymeCreditNoteC,
}

impl VoucherType {
    pub const ALL: [VoucherType; 18] = [
        Self::InvoiceA,
        Self::DebitNoteA,
        Self::CreditNoteA,
        Self::InvoiceB,
        Self::DebitNoteB,
        Self::CreditNoteB,
        Self::InvoiceC,
        Self::DebitNoteC,
        Self::CreditNoteC,
        Self::MipymeInvoiceA,
        Self::MipymeDebitNoteA,
        Self::MipymeCreditNoteA,
        Self::MipymeInvoiceB,
        Self::MipymeDebitNoteB,
        Self::MipymeCreditNoteB,
        Self::MipymeInvoiceC,
        Self::MipymeDebitNoteC,
        Self::MipymeCreditNoteC,
    ];

    /// Numeric `CbteTipo` code.
    pub fn code(&self) -> u16 {
        match self {
            Self::InvoiceA => 1,
            Self::DebitNoteA => 2,
            Self::CreditNoteA => 3,
            Self::InvoiceB => 6,
            Self::DebitNoteB => 7,
            Self::CreditNoteB => 8,
            Self::InvoiceC => 11,
            Self::DebitNoteC => 12,
            Self::CreditNoteC => 13,
            Self::MipymeInvoiceA => 201,
            Self::MipymeDebitNoteA => 202,
            Self::MipymeCreditNoteA => 203,
            Self::MipymeInvoiceB => 206,
            Self::MipymeDebitNoteB => 207,
            Self::MipymeCreditNoteB => 208,
            Self::MipymeInvoiceC => 211,
            Self::MipymeDebitNoteC => 212,
            Self::MipymeCreditNoteC => 213,
        }
    }

    /// Parse from the numeric `CbteTipo` code.
    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    pub fn class(&self) -> VoucherClass {
        match self {
            Self::InvoiceA
            | Self::DebitNoteA
            | Self::CreditNoteA
            | Self::MipymeInvoiceA
            | Self::MipymeDebitNoteA
            | Self::MipymeCreditNoteA => VoucherClass::A,
            Self::InvoiceB
            | Self::DebitNoteB
            | Self::CreditNoteB
            | Self::MipymeInvoiceB
            | Self::MipymeDebitNoteB
            | Self::MipymeCreditNoteB => VoucherClass::B,
            Self::InvoiceC
            | Self::DebitNoteC
            | Self::CreditNoteC
            | Self::MipymeInvoiceC
            | Self::MipymeDebitNoteC
            | Self::MipymeCreditNoteC => VoucherClass::C,
        }
    }

    pub fn kind(&self) -> VoucherKind {
        match self {
            Self::InvoiceA
            | Self::InvoiceB
            | Self::InvoiceC
            | Self::MipymeInvoiceA
            | Self::MipymeInvoiceB
            | Self::MipymeInvoiceC => VoucherKind::Invoice,
            Self::DebitNoteA
            | Self::DebitNoteB
            | Self::DebitNoteC
            | Self::MipymeDebitNoteA
            | Self::MipymeDebitNoteB
            | Self::MipymeDebitNoteC => VoucherKind::DebitNote,
            Self::CreditNoteA
            | Self::CreditNoteB
            | Self::CreditNoteC
            | Self::MipymeCreditNoteA
            | Self::MipymeCreditNoteB
            | Self::MipymeCreditNoteC => VoucherKind::CreditNote,
        }
    }

    pub fn is_credit_note(&self) -> bool {
        self.kind() == VoucherKind::CreditNote
    }

    pub fn is_debit_note(&self) -> bool {
        self.kind() == VoucherKind::DebitNote
    }

    /// Credit and debit notes must reference the vouchers they correct.
    pub fn requires_associated_vouchers(&self) -> bool {
        self.kind() != VoucherKind::Invoice
    }

    /// Name as printed by the authority.
    pub fn description(&self) -> &'static str {
        match self {
            Self::InvoiceA => "Factura A",
            Self::DebitNoteA => "Nota de Débito A",
            Self::CreditNoteA => "Nota de Crédito A",
            Self::InvoiceB => "Factura B",
            Self::DebitNoteB => "Nota de Débito B",
            Self::CreditNoteB => "Nota de Crédito B",
            Self::InvoiceC => "Factura C",
            Self::DebitNoteC => "Nota de Débito C",
            Self::CreditNoteC => "Nota de Crédito C",
            Self::MipymeInvoiceA => "Factura de Crédito Electrónica MiPyMEs (FCE) A",
            Self::MipymeDebitNoteA => "Nota de Débito Electrónica MiPyMEs (FCE) A",
            Self::MipymeCreditNoteA => "Nota de Crédito Electrónica MiPyMEs (FCE) A",
            Self::MipymeInvoiceB => "Factura de Crédito Electrónica MiPyMEs (FCE) B",
            Self::MipymeDebitNoteB => "Nota de Débito Electrónica MiPyMEs (FCE) B",
            Self::MipymeCreditNoteB => "Nota de Crédito Electrónica MiPyMEs (FCE) B",
            Self::MipymeInvoiceC => "Factura de Crédito Electrónica MiPyMEs (FCE) C",
            Self::MipymeDebitNoteC => "Nota de Débito Electrónica MiPyMEs (FCE) C",
            Self::MipymeCreditNoteC => "Nota de Crédito Electrónica MiPyMEs (FCE) C",
        }
    }
}

/// What the voucher bills for (`Concepto`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Concept {
    /// 1: Productos.
    Products,
    /// 2: Servicios.
    Services,
    /// 3: Productos y Servicios.
    ProductsAndServices,
}

impl Concept {
    pub fn code(&self) -> u16 {
        match self {
            Self::Products => 1,
            Self::Services => 2,
            Self::ProductsAndServices => 3,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(Self::Products),
            2 => Some(Self::Services),
            3 => Some(Self::ProductsAndServices),
            _ => None,
        }
    }

    /// Services and mixed vouchers must declare the service period.
    pub fn requires_service_dates(&self) -> bool {
        !matches!(self, Self::Products)
    }
}

/// Receiver identification document type (`DocTipo`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum DocumentType {
    /// 80: CUIT.
    Cuit,
    /// 86: CUIL.
    Cuil,
    /// 87: CDI.
    Cdi,
    /// 89: Libreta de Enrolamiento.
    Le,
    /// 90: Libreta Cívica.
    Lc,
    /// 91: CI Extranjera.
    ForeignId,
    /// 94: Pasaporte.
    Passport,
    /// 96: DNI.
    Dni,
    /// 99: Consumidor Final / sin identificar.
    FinalConsumer,
}

impl DocumentType {
    pub fn code(&self) -> u16 {
        match self {
            Self::Cuit => 80,
            Self::Cuil => 86,
            Self::Cdi => 87,
            Self::Le => 89,
            Self::Lc => 90,
            Self::ForeignId => 91,
            Self::Passport => 94,
            Self::Dni => 96,
            Self::FinalConsumer => 99,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            80 => Some(Self::Cuit),
            86 => Some(Self::Cuil),
            87 => Some(Self::Cdi),
            89 => Some(Self::Le),
            90 => Some(Self::Lc),
            91 => Some(Self::ForeignId),
            94 => Some(Self::Passport),
            96 => Some(Self::Dni),
            99 => Some(Self::FinalConsumer),
            _ => None,
        }
    }

    /// CUIT, CUIL and CDI share the 11-digit mod-11 format.
    pub fn uses_tax_id_checksum(&self) -> bool {
        matches!(self, Self::Cuit | Self::Cuil | Self::Cdi)
    }

    pub fn is_national_id(&self) -> bool {
        matches!(self, Self::Dni)
    }
}

/// VAT rate tier (`Iva.Id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum VatAliquot {
    /// 3: 0%.
    Zero,
    /// 4: 10.5%.
    TenPointFive,
    /// 5: 21%.
    TwentyOne,
    /// 6: 27%.
    TwentySeven,
    /// 8: 5%.
    Five,
    /// 9: 2.5%.
    TwoPointFive,
}

/// Aliquot used to represent exempt lines in the VAT breakdown.
///
/// The authority has no dedicated "exempt" aliquot; exempt receivers are
/// reported with a single 0% entry. If the aliquot catalogue ever changes
/// id 3, exemption handling breaks with it.
pub const EXEMPT_ALIQUOT: VatAliquot = VatAliquot::Zero;

impl VatAliquot {
    pub const ALL: [VatAliquot; 6] = [
        Self::Zero,
        Self::TenPointFive,
        Self::TwentyOne,
        Self::TwentySeven,
        Self::Five,
        Self::TwoPointFive,
    ];

    pub fn code(&self) -> u16 {
        match self {
            Self::Zero => 3,
            Self::TenPointFive => 4,
            Self::TwentyOne => 5,
            Self::TwentySeven => 6,
            Self::Five => 8,
            Self::TwoPointFive => 9,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.code() == code)
    }

    /// Rate as a percentage (21 for 21%).
    pub fn percentage(&self) -> Decimal {
        match self {
            Self::Zero => dec!(0),
            Self::TenPointFive => dec!(10.5),
            Self::TwentyOne => dec!(21),
            Self::TwentySeven => dec!(27),
            Self::Five => dec!(5),
            Self::TwoPointFive => dec!(2.5),
        }
    }

    /// Percentage for a raw aliquot id; unknown ids count as 0%.
    pub fn percentage_for_id(id: u16) -> Decimal {
        Self::from_code(id)
            .map(|a| a.percentage())
            .unwrap_or(Decimal::ZERO)
    }
}

/// Receiver VAT condition (`CondicionIVAReceptorId`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum VatCondition {
    /// 1: IVA Responsable Inscripto.
    Registered,
    /// 4: IVA Sujeto Exento.
    Exempt,
    /// 5: Consumidor Final.
    FinalConsumer,
    /// 6: Responsable Monotributo.
    SmallTaxpayer,
    /// 7: Sujeto No Categorizado.
    Unregistered,
    /// 8: Proveedor del Exterior.
    ForeignSupplier,
    /// 9: Cliente del Exterior.
    ForeignCustomer,
    /// 10: IVA Liberado, Ley 19.640.
    VatReleased,
    /// 13: Monotributista Social.
    SocialSmallTaxpayer,
    /// 15: IVA No Alcanzado.
    NotReached,
    /// 16: Monotributo Trabajador Independiente Promovido.
    PromotedIndependentWorker,
}

impl VatCondition {
    pub fn code(&self) -> u16 {
        match self {
            Self::Registered => 1,
            Self::Exempt => 4,
            Self::FinalConsumer => 5,
            Self::SmallTaxpayer => 6,
            Self::Unregistered => 7,
            Self::ForeignSupplier => 8,
            Self::ForeignCustomer => 9,
            Self::VatReleased => 10,
            Self::SocialSmallTaxpayer => 13,
            Self::NotReached => 15,
            Self::PromotedIndependentWorker => 16,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(Self::Registered),
            4 => Some(Self::Exempt),
            5 => Some(Self::FinalConsumer),
            6 => Some(Self::SmallTaxpayer),
            7 => Some(Self::Unregistered),
            8 => Some(Self::ForeignSupplier),
            9 => Some(Self::ForeignCustomer),
            10 => Some(Self::VatReleased),
            13 => Some(Self::SocialSmallTaxpayer),
            15 => Some(Self::NotReached),
            16 => Some(Self::PromotedIndependentWorker),
            _ => None,
        }
    }

    /// No VAT is charged to exempt receivers.
    pub fn is_exempt(&self) -> bool {
        matches!(self, Self::Exempt)
    }
}

/// Whether the authority accepts a voucher of `voucher_type` issued to a
/// receiver with `condition`.
///
/// Class A requires a VAT-liable registered receiver (responsable inscripto
/// or one of the monotributo regimes). Class B is for every receiver except
/// responsables inscriptos. Class C is issued by monotributistas to anyone.
pub fn is_valid_voucher_condition_combo(voucher_type: VoucherType, condition: VatCondition) -> bool {
    match voucher_type.class() {
        VoucherClass::A => matches!(
            condition,
            VatCondition::Registered
                | VatCondition::SmallTaxpayer
                | VatCondition::SocialSmallTaxpayer
                | VatCondition::PromotedIndependentWorker
        ),
        VoucherClass::B => !matches!(condition, VatCondition::Registered),
        VoucherClass::C => true,
    }
}

macro_rules! code_conversions {
    ($ty:ident, $kind:literal) => {
        impl TryFrom<u16> for $ty {
            type Error = FacturaError;

            fn try_from(code: u16) -> Result<Self, Self::Error> {
                Self::from_code(code).ok_or(FacturaError::UnknownCode { kind: $kind, code })
            }
        }

        impl From<$ty> for u16 {
            fn from(value: $ty) -> u16 {
                value.code()
            }
        }
    };
}

code_conversions!(VoucherType, "voucher type");
code_conversions!(Concept, "concept");
code_conversions!(DocumentType, "document type");
code_conversions!(VatAliquot, "VAT aliquot");
code_conversions!(VatCondition, "VAT condition");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voucher_codes_round_trip() {
        for t in VoucherType::ALL {
            assert_eq!(VoucherType::from_code(t.code()), Some(t));
        }
        assert_eq!(VoucherType::from_code(4), None);
    }

    #[test]
    fn credit_and_debit_notes() {
        for code in [3, 8, 13, 203, 208, 213] {
            let t = VoucherType::from_code(code).unwrap();
            assert!(t.is_credit_note(), "{code}");
            assert!(t.requires_associated_vouchers());
        }
        for code in [2, 7, 12] {
            assert!(VoucherType::from_code(code).unwrap().is_debit_note());
        }
        assert!(!VoucherType::InvoiceB.requires_associated_vouchers());
    }

    #[test]
    fn aliquot_percentages() {
        assert_eq!(VatAliquot::TwentyOne.percentage(), dec!(21));
        assert_eq!(VatAliquot::percentage_for_id(4), dec!(10.5));
        assert_eq!(VatAliquot::percentage_for_id(3), dec!(0));
        assert_eq!(VatAliquot::percentage_for_id(42), dec!(0));
        assert_eq!(EXEMPT_ALIQUOT.code(), 3);
    }

    #[test]
    fn only_exempt_condition_is_exempt() {
        assert!(VatCondition::Exempt.is_exempt());
        assert!(!VatCondition::FinalConsumer.is_exempt());
        assert!(!VatCondition::NotReached.is_exempt());
    }

    #[test]
    fn class_a_requires_registered_receiver() {
        assert!(is_valid_voucher_condition_combo(
            VoucherType::InvoiceA,
            VatCondition::Registered
        ));
        assert!(!is_valid_voucher_condition_combo(
            VoucherType::InvoiceA,
            VatCondition::FinalConsumer
        ));
        assert!(!is_valid_voucher_condition_combo(
            VoucherType::CreditNoteA,
            VatCondition::Exempt
        ));
    }

    #[test]
    fn class_b_rejects_registered_receiver() {
        assert!(!is_valid_voucher_condition_combo(
            VoucherType::InvoiceB,
            VatCondition::Registered
        ));
        assert!(is_valid_voucher_condition_combo(
            VoucherType::InvoiceB,
            VatCondition::FinalConsumer
        ));
        assert!(is_valid_voucher_condition_combo(
            VoucherType::InvoiceB,
            VatCondition::Exempt
        ));
    }

    #[test]
    fn class_c_accepts_everyone() {
        assert!(is_valid_voucher_condition_combo(
            VoucherType::InvoiceC,
            VatCondition::Registered
        ));
        assert!(is_valid_voucher_condition_combo(
            VoucherType::CreditNoteC,
            VatCondition::ForeignCustomer
        ));
    }

    #[test]
    fn serde_uses_numeric_codes() {
        let json = serde_json::to_string(&VoucherType::CreditNoteB).unwrap();
        assert_eq!(json, "8");
        let parsed: VatCondition = serde_json::from_str("4").unwrap();
        assert_eq!(parsed, VatCondition::Exempt);
        assert!(serde_json::from_str::<DocumentType>("81").is_err());
    }

    #[test]
    fn try_from_reports_unknown_code() {
        let err = Concept::try_from(7).unwrap_err();
        assert_eq!(err.to_string(), "unknown concept code 7");
    }
}
