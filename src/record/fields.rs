/// How the backend interprets a field's number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Small integer code standing for a category (gender, housing type, ...)
    Category,
    /// Plain numeric quantity (income, age, counts)
    Quantity,
}

impl FieldKind {
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::Category => "category",
            FieldKind::Quantity => "quantity",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub default: i64,
}

const fn category(name: &'static str, default: i64) -> FieldSpec {
    FieldSpec { name, kind: FieldKind::Category, default }
}

const fn quantity(name: &'static str, default: i64) -> FieldSpec {
    FieldSpec { name, kind: FieldKind::Quantity, default }
}

/// Every field the intake endpoint expects, in wire and display order.
pub static CANONICAL_FIELDS: [FieldSpec; 16] = [
    category("CODE_GENDER", 1),
    category("FLAG_OWN_CAR", 0),
    category("FLAG_OWN_REALTY", 1),
    quantity("CNT_CHILDREN", 0),
    quantity("AMT_INCOME_TOTAL", 50000),
    category("NAME_INCOME_TYPE", 0),
    category("NAME_EDUCATION_TYPE", 1),
    category("NAME_FAMILY_STATUS", 2),
    category("NAME_HOUSING_TYPE", 1),
    category("FLAG_MOBIL", 1),
    category("FLAG_PHONE", 1),
    category("FLAG_EMAIL", 1),
    category("OCCUPATION_TYPE", 3),
    quantity("CNT_FAM_MEMBERS", 3),
    category("STATUS", 1),
    quantity("age", 30),
];

/// Position of a field in the canonical set (exact, case-sensitive match)
pub fn field_index(name: &str) -> Option<usize> {
    CANONICAL_FIELDS.iter().position(|f| f.name == name)
}

pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    field_index(name).map(|i| &CANONICAL_FIELDS[i])
}
