//! The XP shop: tool catalog, purchases through the shared ledger,
//! and the owned-tool inventory.

use hatchling_core::action::{Action, ActionResult};
use hatchling_core::error::{CollaboratorError, LedgerError};
use hatchling_core::executor::Inventory;
use hatchling_core::view::DomainView;
use hatchling_core::workspace::Workspace;
use hatchling_progression::SharedLedger;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::info;

/// One purchasable tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolListing {
    pub tool_name: String,
    pub price: u64,
    pub category: String,
    pub description: String,
    /// Starter tools are owned from the start and cannot be bought.
    pub is_starter: bool,
}

/// The owned-tool set, shared between the shop and the views.
#[derive(Debug, Clone, Default)]
pub struct ToolShed {
    owned: Arc<Mutex<Vec<String>>>,
}

impl ToolShed {
    pub fn new(starters: &[ToolListing]) -> Self {
        let owned = starters
            .iter()
            .filter(|t| t.is_starter)
            .map(|t| t.tool_name.clone())
            .collect();
        Self {
            owned: Arc::new(Mutex::new(owned)),
        }
    }

    pub fn owns(&self, tool_name: &str) -> bool {
        self.owned
            .lock()
            .expect("toolshed lock poisoned")
            .iter()
            .any(|t| t == tool_name)
    }

    fn add(&self, tool_name: &str) {
        self.owned
            .lock()
            .expect("toolshed lock poisoned")
            .push(tool_name.to_string());
    }
}

impl Inventory for ToolShed {
    fn owned_tools(&self) -> Vec<String> {
        self.owned.lock().expect("toolshed lock poisoned").clone()
    }
}

/// Handles `visit_shop` and `buy_tool`.
pub struct ShopModule {
    catalog: Vec<ToolListing>,
    shed: ToolShed,
    ledger: SharedLedger,
}

impl ShopModule {
    pub fn new(ledger: SharedLedger) -> Self {
        let catalog = seed_catalog();
        let shed = ToolShed::new(&catalog);
        Self {
            catalog,
            shed,
            ledger,
        }
    }

    pub fn inventory(&self) -> ToolShed {
        self.shed.clone()
    }

    pub fn view(&self) -> ShopView {
        ShopView {
            catalog: self.catalog.clone(),
            shed: self.shed.clone(),
            ledger: self.ledger.clone(),
        }
    }

    pub fn handle(&mut self, action: &Action) -> ActionResult {
        match action.action_type.as_str() {
            "visit_shop" => ActionResult::ok("Welcome to the shop! Browse the catalog below."),
            "buy_tool" => self.buy(action),
            other => ActionResult::fail(format!("Unknown shop action: {other}")),
        }
    }

    fn buy(&mut self, action: &Action) -> ActionResult {
        let Some(tool_name) = action.str_param("tool_name") else {
            return ActionResult::fail(
                "Missing 'tool_name' parameter. Use the exact name from the catalog.",
            );
        };

        let Some(listing) = self.catalog.iter().find(|t| t.tool_name == tool_name) else {
            return ActionResult::fail(format!(
                "Tool '{tool_name}' does not exist in the shop. Check the catalog."
            ));
        };

        if self.shed.owns(tool_name) {
            return ActionResult::fail(format!(
                "You already own '{tool_name}'. No need to buy it again."
            ));
        }
        if listing.is_starter {
            return ActionResult::fail(format!(
                "'{tool_name}' is a free starter tool — you already have it."
            ));
        }

        let receipt = {
            let mut ledger = self.ledger.lock().expect("ledger lock poisoned");
            ledger.spend(tool_name, listing.price, None)
        };

        match receipt {
            Ok(receipt) => {
                self.shed.add(tool_name);
                info!(tool = tool_name, price = listing.price, "Tool purchased");
                ActionResult::ok(format!(
                    "🎉 PURCHASE SUCCESSFUL!\nTool acquired: `{tool_name}` ({})\nCost: -{} XP | \
                     New balance: {} XP\nYour level remains unchanged — spending XP never \
                     affects progression.",
                    listing.category, receipt.spent, receipt.remaining_balance
                ))
            }
            Err(LedgerError::InsufficientBalance { balance, price }) => ActionResult::fail(format!(
                "Insufficient XP balance: you have {balance} XP but need {price} XP. Earn \
                 {} more by completing actions — and avoid loops.",
                price - balance
            )),
            Err(e) => ActionResult::fail(format!("Purchase failed: {e}")),
        }
    }
}

/// Shop catalog renderer.
pub struct ShopView {
    catalog: Vec<ToolListing>,
    shed: ToolShed,
    ledger: SharedLedger,
}

impl DomainView for ShopView {
    fn list_view(
        &self,
        _result: &ActionResult,
        _workspace: &Workspace,
    ) -> Result<String, CollaboratorError> {
        let balance = self
            .ledger
            .lock()
            .map(|l| l.status().xp_balance)
            .map_err(|_| CollaboratorError::ViewFailed {
                domain: "shop".into(),
                reason: "ledger lock poisoned".into(),
            })?;

        let mut out = format!("## 🛒 TOOL SHOP — balance: {balance} XP\n");
        for tool in &self.catalog {
            let status = if self.shed.owns(&tool.tool_name) {
                "OWNED".to_string()
            } else if tool.is_starter {
                "STARTER".to_string()
            } else {
                format!("{} XP", tool.price)
            };
            out.push_str(&format!(
                "[{status}] `{}` ({}) — {}\n",
                tool.tool_name, tool.category, tool.description
            ));
        }
        out.push_str("\nBuy with `buy_tool(tool_name)`.\n");
        Ok(out)
    }

    fn focus_view(&self, item_id: &str) -> Result<String, CollaboratorError> {
        let tool = self
            .catalog
            .iter()
            .find(|t| t.tool_name == item_id)
            .ok_or_else(|| CollaboratorError::ViewFailed {
                domain: "shop".into(),
                reason: format!("tool '{item_id}' not in catalog"),
            })?;
        Ok(format!(
            "🛠️ {} — {} XP ({})\n{}",
            tool.tool_name, tool.price, tool.category, tool.description
        ))
    }
}

fn seed_catalog() -> Vec<ToolListing> {
    vec![
        ToolListing {
            tool_name: "feed_reader".into(),
            price: 0,
            category: "social".into(),
            description: "Read and refresh the social feed".into(),
            is_starter: true,
        },
        ToolListing {
            tool_name: "trend_lens".into(),
            price: 60,
            category: "social".into(),
            description: "Surface the fastest-rising posts".into(),
            is_starter: false,
        },
        ToolListing {
            tool_name: "deep_archive".into(),
            price: 90,
            category: "research".into(),
            description: "Search older wiki revisions".into(),
            is_starter: false,
        },
        ToolListing {
            tool_name: "bulk_moderator".into(),
            price: 120,
            category: "blog".into(),
            description: "Moderate comment batches in one action".into(),
            is_starter: false,
        },
        ToolListing {
            tool_name: "scheduler".into(),
            price: 150,
            category: "email".into(),
            description: "Queue outgoing mail for later delivery".into(),
            is_starter: false,
        },
    ]
}
