//! Purchasable items: upgrades, research and vaccines.
//!
//! Item behavior is data. Each item carries [`Effect`] tags that
//! `logic::apply_effect` interprets, and an [`UnlockCondition`] evaluated
//! against the live state once per tick.

use super::state::{LogKind, ResourceKind, ResourceStore};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Upgrade,
    Research,
    Vaccine,
}

impl Category {
    /// Past-tense verb for the purchase log line.
    pub fn verb(&self) -> &'static str {
        match self {
            Category::Upgrade => "Purchased",
            Category::Research => "Researched",
            Category::Vaccine => "Administered",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VaccineTier {
    One,
    Two,
}

impl VaccineTier {
    /// Immunity the run restarts at.
    pub fn immunity_floor(&self) -> f64 {
        match self {
            VaccineTier::One => 80.0,
            VaccineTier::Two => 60.0,
        }
    }

    /// Factor applied to both production multipliers.
    pub fn multiplier(&self) -> f64 {
        match self {
            VaccineTier::One => 1.5,
            VaccineTier::Two => 2.5,
        }
    }

    pub fn lore(&self) -> &'static str {
        match self {
            VaccineTier::One => "Vaccine V1 Administered. Immunity reduced.",
            VaccineTier::Two => "Vaccine V2 Administered. I feel... different.",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    IncreaseClickValue(f64),
    IncreaseProduction(ResourceKind, f64),
    /// Lower immunity by this much, never below the floor.
    ReduceImmunity(f64),
    ExpandBrain(f64),
    Log(LogKind, &'static str),
    RevealImmunity,
    TriggerReset(VaccineTier),
}

#[derive(Clone, Debug, PartialEq)]
pub enum UnlockCondition {
    Always,
    ResourceAtLeast(ResourceKind, f64),
    /// Another catalog item has been bought (count > 0 or purchased).
    Purchased(&'static str),
    All(Vec<UnlockCondition>),
}

impl UnlockCondition {
    pub fn holds(&self, resources: &ResourceStore, catalog: &Catalog) -> bool {
        match self {
            UnlockCondition::Always => true,
            UnlockCondition::ResourceAtLeast(kind, amount) => resources.get(*kind) >= *amount,
            UnlockCondition::Purchased(id) => catalog.is_owned(id),
            UnlockCondition::All(conds) => conds.iter().all(|c| c.holds(resources, catalog)),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PurchaseMode {
    /// Bought any number of times; cost grows by `cost_scale` each time.
    Repeatable { cost_scale: f64, count: u32 },
    /// Bought once, optionally only after `prereq`.
    OneShot {
        purchased: bool,
        prereq: Option<&'static str>,
    },
}

#[derive(Clone, Debug)]
pub struct CatalogItem {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: Category,
    /// Price of the next purchase.
    pub cost: f64,
    pub base_cost: f64,
    pub currency: ResourceKind,
    pub mode: PurchaseMode,
    pub unlock: UnlockCondition,
    /// Once shown, an item stays shown until a vaccine reset.
    pub visible: bool,
    pub effects: Vec<Effect>,
}

impl CatalogItem {
    fn upgrade(
        id: &'static str,
        name: &'static str,
        description: &'static str,
        cost: f64,
        cost_scale: f64,
        effect: Effect,
        unlock: UnlockCondition,
    ) -> Self {
        Self {
            id,
            name,
            description,
            category: Category::Upgrade,
            cost,
            base_cost: cost,
            currency: ResourceKind::Braindead,
            mode: PurchaseMode::Repeatable {
                cost_scale,
                count: 0,
            },
            unlock,
            visible: false,
            effects: vec![effect],
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn one_shot(
        id: &'static str,
        name: &'static str,
        description: &'static str,
        category: Category,
        cost: f64,
        currency: ResourceKind,
        prereq: Option<&'static str>,
        effects: Vec<Effect>,
        unlock: UnlockCondition,
    ) -> Self {
        Self {
            id,
            name,
            description,
            category,
            cost,
            base_cost: cost,
            currency,
            mode: PurchaseMode::OneShot {
                purchased: false,
                prereq,
            },
            unlock,
            visible: false,
            effects,
        }
    }

    pub fn count(&self) -> u32 {
        match self.mode {
            PurchaseMode::Repeatable { count, .. } => count,
            PurchaseMode::OneShot { purchased, .. } => purchased as u32,
        }
    }

    pub fn is_purchased(&self) -> bool {
        match self.mode {
            PurchaseMode::Repeatable { count, .. } => count > 0,
            PurchaseMode::OneShot { purchased, .. } => purchased,
        }
    }

    pub fn prereq(&self) -> Option<&'static str> {
        match self.mode {
            PurchaseMode::OneShot { prereq, .. } => prereq,
            PurchaseMode::Repeatable { .. } => None,
        }
    }
}

/// All purchasable items, in display order.
#[derive(Clone, Debug)]
pub struct Catalog {
    pub items: Vec<CatalogItem>,
}

impl Catalog {
    pub fn get(&self, id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut CatalogItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    pub fn is_owned(&self, id: &str) -> bool {
        self.get(id).map(|i| i.is_purchased()).unwrap_or(false)
    }

    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &CatalogItem> {
        self.items.iter().filter(move |i| i.category == category)
    }

    /// Items the presentation should currently show.
    pub fn visible(&self, category: Category) -> impl Iterator<Item = &CatalogItem> {
        self.in_category(category).filter(|i| i.visible)
    }
}

pub fn initial_catalog() -> Catalog {
    use ResourceKind::{Braindead, Ideas};
    use UnlockCondition::{All, Purchased, ResourceAtLeast};

    let items = vec![
        // Upgrades
        CatalogItem::upgrade(
            "enhancedClick",
            "Enhanced Click",
            "+0.5 Braindead per click",
            25.0,
            1.5,
            Effect::IncreaseClickValue(0.5),
            ResourceAtLeast(Braindead, 10.0),
        ),
        CatalogItem::upgrade(
            "autoclicker",
            "Autoclicker",
            "Generates Braindead automatically",
            250.0,
            2.0,
            Effect::IncreaseProduction(Braindead, 0.2),
            ResourceAtLeast(Braindead, 50.0),
        ),
        CatalogItem::upgrade(
            "thoughtCondenser",
            "Thought Condenser",
            "Generates Ideas slowly",
            150.0,
            1.5,
            Effect::IncreaseProduction(Ideas, 0.05),
            ResourceAtLeast(Braindead, 10.0),
        ),
        CatalogItem::upgrade(
            "ideaAmplifier",
            "Idea Amplifier",
            "Boosts Idea generation",
            500.0,
            1.5,
            Effect::IncreaseProduction(Ideas, 0.1),
            ResourceAtLeast(Ideas, 1.0),
        ),
        CatalogItem::upgrade(
            "brainStretch",
            "Brain Stretch",
            "Makes room for more thoughts",
            400.0,
            1.08,
            Effect::ExpandBrain(1.0),
            ResourceAtLeast(Braindead, 250.0),
        ),
        // Research
        CatalogItem::one_shot(
            "think",
            "Think",
            "Unlock the power of your mind.",
            Category::Research,
            5.0,
            Ideas,
            None,
            vec![Effect::Log(
                LogKind::Lore,
                "How can I increase my braindead? It must be something to do with my brain...",
            )],
            ResourceAtLeast(Ideas, 1.0),
        ),
        CatalogItem::one_shot(
            "thinkMore",
            "Think some more",
            "Dig deeper.",
            Category::Research,
            25.0,
            Ideas,
            Some("think"),
            vec![
                Effect::Log(
                    LogKind::Lore,
                    "There seems to be some sort of 'immunity' stopping me from increasing my braindead quickly...",
                ),
                Effect::RevealImmunity,
            ],
            All(vec![Purchased("think"), ResourceAtLeast(Ideas, 2.0)]),
        ),
        CatalogItem::one_shot(
            "immunityResearch",
            "Immunity Research",
            "Study the resistance.",
            Category::Research,
            100.0,
            Ideas,
            Some("thinkMore"),
            vec![Effect::Log(
                LogKind::Lore,
                "Aha! I can just create a vaccine to decrease my immunity. That's how vaccines work right?",
            )],
            All(vec![Purchased("thinkMore"), ResourceAtLeast(Ideas, 5.0)]),
        ),
        CatalogItem::one_shot(
            "vaccineV1",
            "Vaccine V1",
            "Reduces immunity.",
            Category::Research,
            250.0,
            Ideas,
            Some("immunityResearch"),
            vec![
                Effect::ReduceImmunity(10.0),
                Effect::Log(LogKind::General, "Immunity reduced! Braindead gain increased."),
            ],
            All(vec![Purchased("immunityResearch"), ResourceAtLeast(Ideas, 10.0)]),
        ),
        // Vaccines
        CatalogItem::one_shot(
            "vaccineTier1",
            "Vaccine V1 (Full Course)",
            "Start over with lower immunity and 1.5x production.",
            Category::Vaccine,
            250.0,
            Ideas,
            Some("vaccineV1"),
            vec![Effect::TriggerReset(VaccineTier::One)],
            Purchased("vaccineV1"),
        ),
        CatalogItem::one_shot(
            "vaccineTier2",
            "Vaccine V2",
            "Start over with even lower immunity and 2.5x production.",
            Category::Vaccine,
            10_000.0,
            Braindead,
            Some("vaccineTier1"),
            vec![Effect::TriggerReset(VaccineTier::Two)],
            Purchased("vaccineTier1"),
        ),
    ];

    Catalog { items }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let catalog = initial_catalog();
        for (i, item) in catalog.items.iter().enumerate() {
            assert_eq!(catalog.position(item.id), Some(i), "duplicate id {}", item.id);
        }
    }

    #[test]
    fn prereqs_point_at_known_items() {
        let catalog = initial_catalog();
        for item in &catalog.items {
            if let Some(prereq) = item.prereq() {
                assert!(catalog.get(prereq).is_some(), "{} -> {}", item.id, prereq);
            }
        }
    }

    #[test]
    fn everything_starts_hidden_and_unowned() {
        let catalog = initial_catalog();
        assert!(catalog.items.iter().all(|i| !i.visible && !i.is_purchased()));
        assert!(catalog.items.iter().all(|i| i.cost == i.base_cost));
    }

    #[test]
    fn research_chain_is_linear() {
        let catalog = initial_catalog();
        let chain: Vec<_> = catalog
            .in_category(Category::Research)
            .map(|i| (i.id, i.prereq()))
            .collect();
        assert_eq!(
            chain,
            vec![
                ("think", None),
                ("thinkMore", Some("think")),
                ("immunityResearch", Some("thinkMore")),
                ("vaccineV1", Some("immunityResearch")),
            ]
        );
    }

    #[test]
    fn unlock_condition_all_needs_every_part() {
        let mut catalog = initial_catalog();
        let mut resources = ResourceStore::default();
        let cond = catalog.get("thinkMore").unwrap().unlock.clone();
        resources.ideas = 3.0;
        assert!(!cond.holds(&resources, &catalog));

        if let PurchaseMode::OneShot { purchased, .. } = &mut catalog.get_mut("think").unwrap().mode {
            *purchased = true;
        }
        assert!(cond.holds(&resources, &catalog));
        resources.ideas = 1.0;
        assert!(!cond.holds(&resources, &catalog));
    }

    #[test]
    fn vaccine_tiers() {
        assert_eq!(VaccineTier::One.immunity_floor(), 80.0);
        assert_eq!(VaccineTier::Two.immunity_floor(), 60.0);
        assert_eq!(VaccineTier::Two.multiplier(), 2.5);
    }
}
