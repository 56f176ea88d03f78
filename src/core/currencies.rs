//! Authority currency identifiers (`MonId`).
//!
//! The WSFE service does not use ISO 4217 codes: pesos are `PES`, US
//! dollars `DOL`, and most other currencies a three-digit string.

/// Currency assumed when a request does not name one.
pub const DEFAULT_CURRENCY: &str = "PES";

/// Check whether `id` is a currency id the authority publishes.
pub fn is_known_currency_id(id: &str) -> bool {
    CURRENCY_IDS.binary_search(&id).is_ok()
}

/// Authority currency ids, sorted for binary search.
static CURRENCY_IDS: &[&str] = &[
    "002", // Dólar Libre EEUU
    "010", // Pesos Mejicanos
    "011", // Pesos Uruguayos
    "012", // Real
    "014", // Coronas Danesas
    "015", // Coronas Noruegas
    "016", // Coronas Suecas
    "018", // Dólar Canadiense
    "019", // Yens
    "021", // Libra Esterlina
    "023", // Bolívar Venezolano
    "024", // Corona Checa
    "026", // Dólar Australiano
    "029", // Güaraní
    "031", // Peso Boliviano
    "032", // Peso Colombiano
    "033", // Peso Chileno
    "034", // Rand Sudafricano
    "051", // Dólar de Hong Kong
    "052", // Dólar de Singapur
    "053", // Dólar de Jamaica
    "054", // Dólar de Taiwan
    "056", // Forint
    "057", // Yuan
    "059", // Dinar Kuwaiti
    "060", // Euro
    "061", // Zloty Polaco
    "062", // Rupia Hindú
    "063", // Lempira Hondureña
    "064", // Yuan (Rep. Pop. China)
    "DOL", // Dólar Estadounidense
    "PES", // Pesos Argentinos
];
