use crate::core::services::HierarchyReport;
use crate::currency::{format_currency_value, Currency, LocaleConfig, NegativeStyle};
use crate::hierarchy::RolledTree;

const INDENT: &str = "   ";
const BRANCH: &str = "|- ";
const MAX_INDENT: usize = 32;

/// Formatting settings for rendered amounts.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub locale: LocaleConfig,
    pub negative_style: NegativeStyle,
}

impl RenderOptions {
    fn amount(&self, value: f64, currency: Currency) -> String {
        format_currency_value(value, currency, &self.locale, self.negative_style)
    }
}

/// Renders one rolled tree, one account per line:
///
/// ```text
/// Banks [Payment]  $175.00
///    |- Checking [Payment]  $75.00
///       |- Pocket [Payment]  $25.00
/// ```
///
/// Accounts held in another currency also show their native balance.
/// Indentation stops growing at `MAX_INDENT` levels; deeper accounts carry
/// their depth in the branch marker instead.
pub fn render_tree(tree: &RolledTree, display: Currency, options: &RenderOptions) -> Vec<String> {
    tree.flatten()
        .map(|(depth, node)| {
            let prefix = match depth {
                0 => String::new(),
                depth if depth <= MAX_INDENT => format!("{}{}", INDENT.repeat(depth - 1), BRANCH),
                depth => format!("{}|{}- ", INDENT.repeat(MAX_INDENT - 1), depth),
            };
            let mut line = format!(
                "{}{} [{:?}]  {}",
                prefix,
                node.name,
                node.kind,
                options.amount(node.rolled_value, display)
            );
            if node.currency != display {
                line.push_str(&format!(
                    "  (own {})",
                    options.amount(node.balance, node.currency)
                ));
            }
            line
        })
        .collect()
}

/// Renders the totals footer of a report.
pub fn render_totals(report: &HierarchyReport, options: &RenderOptions) -> Vec<String> {
    vec![
        format!("Assets:       {}", options.amount(report.assets, report.currency)),
        format!("Liabilities:  {}", options.amount(report.liabilities, report.currency)),
        format!("Net:          {}", options.amount(report.net_total(), report.currency)),
    ]
}
