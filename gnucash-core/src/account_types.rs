/// Allowed account types.
///
/// The set is fixed by the GnuCash schema (`act:type`). Account type drives
/// sign conventions for downstream aggregation, so an unrecognized literal is
/// a load error rather than a pass-through string.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AccountType {
    Root,
    Bank,
    Cash,
    Credit,
    Asset,
    Liability,
    Stock,
    Mutual,
    Currency,
    Income,
    Expense,
    Equity,
    Receivable,
    Payable,
    Trading,
}

impl AccountType {
    /// Parses the schema literal, e.g. `"ASSET"`. Returns `None` for
    /// anything outside the fixed set.
    pub fn from_tag(tag: &str) -> Option<AccountType> {
        use AccountType::*;
        Some(match tag {
            "ROOT" => Root,
            "BANK" => Bank,
            "CASH" => Cash,
            "CREDIT" => Credit,
            "ASSET" => Asset,
            "LIABILITY" => Liability,
            "STOCK" => Stock,
            "MUTUAL" => Mutual,
            "CURRENCY" => Currency,
            "INCOME" => Income,
            "EXPENSE" => Expense,
            "EQUITY" => Equity,
            "RECEIVABLE" => Receivable,
            "PAYABLE" => Payable,
            "TRADING" => Trading,
            _ => return None,
        })
    }

    pub fn as_tag(&self) -> &'static str {
        use AccountType::*;
        match self {
            Root => "ROOT",
            Bank => "BANK",
            Cash => "CASH",
            Credit => "CREDIT",
            Asset => "ASSET",
            Liability => "LIABILITY",
            Stock => "STOCK",
            Mutual => "MUTUAL",
            Currency => "CURRENCY",
            Income => "INCOME",
            Expense => "EXPENSE",
            Equity => "EQUITY",
            Receivable => "RECEIVABLE",
            Payable => "PAYABLE",
            Trading => "TRADING",
        }
    }

    pub fn is_root(&self) -> bool {
        *self == AccountType::Root
    }
}

#[cfg(test)]
mod tests {
    use super::AccountType;

    #[test]
    fn round_trips_every_tag() {
        use AccountType::*;
        let all = [
            Root, Bank, Cash, Credit, Asset, Liability, Stock, Mutual, Currency, Income,
            Expense, Equity, Receivable, Payable, Trading,
        ];
        for ty in all.iter() {
            assert_eq!(AccountType::from_tag(ty.as_tag()), Some(*ty));
        }
    }

    #[test]
    fn rejects_unknown_literals() {
        assert_eq!(AccountType::from_tag("BOGUS"), None);
        assert_eq!(AccountType::from_tag("asset"), None);
        assert_eq!(AccountType::from_tag(""), None);
    }
}
