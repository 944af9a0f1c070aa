//! Declarative catalog of calculator pages.
//!
//! Each page names the subcommand that runs it and the fields it takes, so
//! listing, searching and help text all come from one table.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Tax,
    Finance,
    Network,
}

impl fmt::Display for Category {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.pad(match self {
            Self::Tax => "tax",
            Self::Finance => "finance",
            Self::Network => "network",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Amount,
    Rate,
    Count,
    Text,
    Choice(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

const fn required(
    name: &'static str,
    label: &'static str,
    kind: FieldKind,
) -> Field {
    Field {
        name,
        label,
        kind,
        required: true,
    }
}

const fn optional(
    name: &'static str,
    label: &'static str,
    kind: FieldKind,
) -> Field {
    Field {
        name,
        label,
        kind,
        required: false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalculatorPage {
    /// Subcommand name.
    pub id: &'static str,
    pub title: &'static str,
    pub category: Category,
    pub keywords: &'static [&'static str],
    pub fields: &'static [Field],
}

impl CalculatorPage {
    fn matches(
        &self,
        needle: &str,
    ) -> bool {
        self.id.contains(needle)
            || self.title.to_lowercase().contains(needle)
            || self.keywords.iter().any(|k| k.contains(needle))
    }
}

pub static CATALOG: &[CalculatorPage] = &[
    CalculatorPage {
        id: "tax",
        title: "Progressive income tax",
        category: Category::Tax,
        keywords: &["income", "bracket", "progressive", "marginal", "종합소득세"],
        fields: &[
            required("amount", "Taxable amount", FieldKind::Amount),
            optional("regime", "Table", FieldKind::Choice(&["income", "freelancer"])),
            optional("year", "Tax year", FieldKind::Count),
        ],
    },
    CalculatorPage {
        id: "freelancer",
        title: "Freelancer 3.3% settlement",
        category: Category::Tax,
        keywords: &["freelancer", "withholding", "3.3", "refund", "settlement", "프리랜서"],
        fields: &[
            required("gross", "Gross income", FieldKind::Amount),
            required("expense-ratio", "Expense ratio", FieldKind::Rate),
            optional("deductions", "Additional deductions", FieldKind::Amount),
            optional("prepaid", "Tax already withheld", FieldKind::Amount),
            optional("year", "Tax year", FieldKind::Count),
        ],
    },
    CalculatorPage {
        id: "vat",
        title: "VAT",
        category: Category::Tax,
        keywords: &["vat", "value added", "supply", "부가세"],
        fields: &[
            required("amount", "Amount", FieldKind::Amount),
            optional("inclusive", "Amount includes VAT", FieldKind::Choice(&["true", "false"])),
            optional("rate", "VAT rate", FieldKind::Rate),
        ],
    },
    CalculatorPage {
        id: "compound",
        title: "Compound interest",
        category: Category::Finance,
        keywords: &["interest", "savings", "deposit", "investment", "복리"],
        fields: &[
            required("principal", "Principal", FieldKind::Amount),
            required("rate", "Annual rate", FieldKind::Rate),
            required("years", "Years", FieldKind::Count),
            optional(
                "frequency",
                "Compounding",
                FieldKind::Choice(&["annually", "quarterly", "monthly"]),
            ),
            optional("contribution", "Contribution per period", FieldKind::Amount),
        ],
    },
    CalculatorPage {
        id: "loan",
        title: "Loan repayment",
        category: Category::Finance,
        keywords: &["loan", "mortgage", "amortization", "installment", "대출"],
        fields: &[
            required("principal", "Principal", FieldKind::Amount),
            required("rate", "Annual rate", FieldKind::Rate),
            required("months", "Term in months", FieldKind::Count),
            optional(
                "method",
                "Repayment method",
                FieldKind::Choice(&["equal-payment", "equal-principal", "bullet"]),
            ),
        ],
    },
    CalculatorPage {
        id: "exchange",
        title: "Currency converter",
        category: Category::Finance,
        keywords: &["currency", "exchange", "fx", "usd", "krw", "환율"],
        fields: &[
            required("amount", "Amount", FieldKind::Amount),
            required("from", "From currency", FieldKind::Text),
            required("to", "To currency", FieldKind::Text),
        ],
    },
    CalculatorPage {
        id: "subnet",
        title: "IPv4 subnet",
        category: Category::Network,
        keywords: &["ip", "cidr", "netmask", "subnet", "network"],
        fields: &[
            required("cidr", "Address/prefix", FieldKind::Text),
            optional("mask", "Dotted netmask", FieldKind::Text),
        ],
    },
];

/// Pages whose id, title or keywords contain `query`, case-insensitively,
/// in catalog order. An empty query returns every page.
pub fn search(query: &str) -> Vec<&'static CalculatorPage> {
    let needle = query.trim().to_lowercase();
    CATALOG
        .iter()
        .filter(|page| needle.is_empty() || page.matches(&needle))
        .collect()
}

pub fn find(id: &str) -> Option<&'static CalculatorPage> {
    CATALOG.iter().find(|page| page.id == id)
}
