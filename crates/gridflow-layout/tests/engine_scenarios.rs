#![forbid(unsafe_code)]

//! End-to-end scenarios through the public [`GridEngine`] API.
//!
//! Run with `RUST_LOG=gridflow_layout=trace cargo test -p gridflow-layout
//! --test engine_scenarios -- --nocapture` to see placement and relayout
//! traces.

use std::cell::{Cell as StdCell, RefCell};
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use gridflow_core::geometry::{Rect, Size};
use gridflow_layout::config::{ENV_ANIMATED, ENV_COLUMNS, ENV_FLOW, ENV_SPACING, ENV_WRAP_NAV};
use gridflow_layout::{
    Cell, FocusEvent, GridConfiguration, GridEngine, GridEvent, GridFlow, GridItem, ItemHandle,
    ItemId, NavIntent, TransitionKind,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

struct Tile {
    id: u64,
    natural: StdCell<Size>,
    focusable: StdCell<bool>,
}

impl Tile {
    fn new(id: u64) -> Rc<Self> {
        Rc::new(Self {
            id,
            natural: StdCell::new(Size::new(60.0, 30.0)),
            focusable: StdCell::new(true),
        })
    }
}

impl ItemHandle for Tile {
    fn item_id(&self) -> ItemId {
        ItemId(self.id)
    }

    fn natural_size(&self) -> Size {
        self.natural.get()
    }

    fn is_focusable(&self) -> bool {
        self.focusable.get()
    }
}

fn tiles(n: u64) -> Vec<Rc<Tile>> {
    (0..n).map(Tile::new).collect()
}

fn engine(config: GridConfiguration) -> GridEngine {
    GridEngine::new(config)
        .with_motion_preference(|| false)
        .with_container(Size::new(400.0, 200.0))
}

fn origins(engine: &mut GridEngine) -> Vec<Cell> {
    engine
        .relayout()
        .items()
        .iter()
        .map(|item| item.placement.origin())
        .collect()
}

#[test]
fn four_auto_items_fill_two_columns() {
    init_tracing();
    info!("4 items, 2 columns, row flow");
    let ts = tiles(4);
    let mut e = engine(GridConfiguration::new().columns(2));
    for t in &ts {
        assert!(e.add_item(GridItem::new(t)));
    }
    assert_eq!(
        origins(&mut e),
        vec![Cell::new(0, 0), Cell::new(0, 1), Cell::new(1, 0), Cell::new(1, 1)]
    );

    // (400 - 8) / 2 = 196 wide, (200 - 8) / 2 = 96 tall.
    let r = e.relayout();
    assert_eq!(r.item_rect(ItemId(0)), Some(Rect::new(0.0, 0.0, 196.0, 96.0)));
    assert_eq!(r.item_rect(ItemId(3)), Some(Rect::new(204.0, 104.0, 196.0, 96.0)));
    assert_eq!(r.grid_size(), Size::new(400.0, 200.0));
}

#[test]
fn spanning_block_pushes_auto_item_to_free_cell() {
    init_tracing();
    info!("2x2 block at origin on a 3x3 grid");
    let ts = tiles(2);
    let mut e = engine(GridConfiguration::new().columns(3).rows(3));
    e.add_item(GridItem::new(&ts[0]).at(0, 0).span(2, 2));
    e.add_item(GridItem::new(&ts[1]));
    let r = e.relayout();

    let block = r.item(ItemId(0)).map(|i| i.placement);
    let footprint: BTreeSet<Cell> = block.map(|p| p.cells().collect()).unwrap_or_default();
    let expected: BTreeSet<Cell> = [
        Cell::new(0, 0),
        Cell::new(0, 1),
        Cell::new(1, 0),
        Cell::new(1, 1),
    ]
    .into_iter()
    .collect();
    assert_eq!(footprint, expected);
    assert_eq!(
        r.item(ItemId(1)).map(|i| i.placement.origin()),
        Some(Cell::new(0, 2))
    );
    for cell in &expected {
        assert_eq!(r.owner_at(*cell), Some(ItemId(0)));
    }
}

#[test]
fn column_flow_fills_columns_first() {
    init_tracing();
    let ts = tiles(4);
    let mut e = engine(GridConfiguration::new().rows(2).flow(GridFlow::Column));
    for t in &ts {
        e.add_item(GridItem::new(t));
    }
    assert_eq!(
        origins(&mut e),
        vec![Cell::new(0, 0), Cell::new(1, 0), Cell::new(0, 1), Cell::new(1, 1)]
    );
}

#[test]
fn order_property_reorders_placement() {
    init_tracing();
    let ts = tiles(3);
    let mut e = engine(GridConfiguration::new().columns(3));
    e.add_item(GridItem::new(&ts[0]));
    e.add_item(GridItem::new(&ts[1]));
    e.add_item(GridItem::new(&ts[2]).order(-1));
    let r = e.relayout();
    let column = |id| r.item(ItemId(id)).map(|i| i.placement.column);
    assert_eq!(column(2), Some(0));
    assert_eq!(column(0), Some(1));
    assert_eq!(column(1), Some(2));
}

#[test]
fn removing_focused_item_leaves_no_focus() {
    init_tracing();
    info!("focus removal");
    let ts = tiles(4);
    let mut e = engine(GridConfiguration::new().columns(2));
    for t in &ts {
        e.add_item(GridItem::new(t));
    }
    assert_eq!(e.focus_item(ItemId(3)), Some(Cell::new(1, 1)));
    assert!(e.remove_item(ItemId(3)));
    assert_eq!(e.focused(), None);
    for intent in [NavIntent::Up, NavIntent::Left, NavIntent::Next, NavIntent::Home] {
        assert_eq!(e.navigate(intent), None, "{intent:?}");
    }
    assert_eq!(
        e.focus_navigator().focus_event(),
        Some(&FocusEvent::FocusLost { id: ItemId(3) })
    );
}

#[test]
fn dropped_focused_handle_is_pruned() {
    init_tracing();
    let mut ts = tiles(2);
    let mut e = engine(GridConfiguration::new().columns(2));
    for t in &ts {
        e.add_item(GridItem::new(t));
    }
    e.focus_item(ItemId(1));
    ts.pop();
    let r = e.relayout();
    assert_eq!(r.items().len(), 1);
    assert_eq!(e.focused(), None);
    assert_eq!(e.navigate(NavIntent::Right), None);
}

#[test]
fn keyboard_walk_with_and_without_wrap() {
    init_tracing();
    let ts = tiles(4);
    let mut e = engine(GridConfiguration::new().columns(2));
    for t in &ts {
        e.add_item(GridItem::new(t));
    }
    assert_eq!(e.focus_first(), Some(Cell::new(0, 0)));
    assert_eq!(e.navigate(NavIntent::Right), Some(Cell::new(0, 1)));
    assert_eq!(e.navigate(NavIntent::Right), None);
    assert_eq!(e.navigate(NavIntent::Down), Some(Cell::new(1, 1)));
    assert_eq!(e.navigate(NavIntent::Next), Some(Cell::new(0, 0)));
    assert_eq!(e.navigate(NavIntent::End), Some(Cell::new(1, 1)));
    assert_eq!(e.navigate(NavIntent::End), None);

    assert!(e.reconfigure(|c| c.wrap_navigation(true)));
    e.relayout();
    assert_eq!(e.navigate(NavIntent::Right), Some(Cell::new(1, 0)));
    assert_eq!(e.navigate(NavIntent::Down), Some(Cell::new(0, 0)));
}

#[test]
fn unfocusable_items_are_skipped() {
    init_tracing();
    let ts = tiles(3);
    ts[1].focusable.set(false);
    let mut e = engine(GridConfiguration::new().columns(3));
    for t in &ts {
        e.add_item(GridItem::new(t));
    }
    assert_eq!(e.focus_first(), Some(Cell::new(0, 0)));
    assert_eq!(e.navigate(NavIntent::Right), Some(Cell::new(0, 2)));
    assert_eq!(e.focus_item(ItemId(1)), None);
}

#[test]
fn disabled_animation_never_plans_transitions() {
    init_tracing();
    info!("animated=false");
    let ts = tiles(4);
    let mut e = GridEngine::new(GridConfiguration::new().columns(2).animated(false))
        .with_motion_preference(|| false)
        .with_container(Size::new(400.0, 200.0));
    for t in &ts {
        e.add_item(GridItem::new(t));
    }
    let before = e.relayout();
    for width in [300.0, 520.0, 160.0] {
        e.resize(Size::new(width, 200.0));
        e.move_item(0, 3);
        let after = e.relayout();
        assert_ne!(before.item_rect(ItemId(0)), after.item_rect(ItemId(0)));
        assert!(e.transition_plan().is_some_and(|p| p.is_empty()));
    }
}

#[test]
fn animated_resize_plans_staggered_moves() {
    init_tracing();
    let ts = tiles(4);
    let mut e = engine(GridConfiguration::new().columns(2));
    for t in &ts {
        e.add_item(GridItem::new(t));
    }
    e.relayout();
    e.resize(Size::new(600.0, 200.0));
    e.relayout();
    let plan = e.transition_plan().cloned().expect("plan after relayout");
    assert_eq!(plan.entries.len(), 4);
    assert!(plan.entries.iter().all(|en| en.kind == TransitionKind::Move));
    let delays: Vec<u128> = plan.entries.iter().map(|en| en.delay.as_millis()).collect();
    assert_eq!(delays, vec![0, 20, 40, 60]);

    let added = Tile::new(9);
    e.add_item(GridItem::new(&added));
    e.relayout();
    let plan = e.transition_plan().cloned().expect("plan after relayout");
    let enter = plan.entry(ItemId(9)).map(|en| en.kind);
    assert_eq!(enter, Some(TransitionKind::Enter));
}

#[test]
fn notifications_are_synchronous_and_ordered() {
    init_tracing();
    let ts = tiles(2);
    let mut e = engine(GridConfiguration::new());
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let sub = e.subscribe(move |event| sink.borrow_mut().push(*event));

    e.add_item(GridItem::new(&ts[0]));
    assert_eq!(log.borrow().len(), 1, "delivered before add_item returns");
    e.insert_item(0, GridItem::new(&ts[1]));
    e.reconfigure(|c| c.columns(2));
    e.relayout();
    e.clear();

    let events = log.borrow().clone();
    assert_eq!(events[0], GridEvent::ItemAdded { index: 0, id: ItemId(0) });
    assert_eq!(events[1], GridEvent::ItemAdded { index: 0, id: ItemId(1) });
    assert_eq!(events[2], GridEvent::ConfigurationChanged);
    assert!(matches!(
        events[3],
        GridEvent::LayoutChanged { columns: 2, rows: 1, item_count: 2, .. }
    ));
    assert_eq!(events[4], GridEvent::ItemRemoved { index: 1, id: ItemId(0) });
    assert_eq!(events[5], GridEvent::ItemRemoved { index: 0, id: ItemId(1) });

    drop(sub);
    e.add_item(GridItem::new(&ts[0]));
    assert_eq!(log.borrow().len(), 6);
}

#[test]
fn natural_size_change_is_picked_up() {
    init_tracing();
    let t = Tile::new(1);
    let mut e = engine(
        GridConfiguration::new()
            .columns(1)
            .align_items(gridflow_layout::ItemAlignment::Start)
            .justify_items(gridflow_layout::ItemAlignment::Center),
    );
    e.add_item(GridItem::new(&t));
    assert_eq!(e.item_rect(ItemId(1)), Some(Rect::new(170.0, 0.0, 60.0, 30.0)));
    t.natural.set(Size::new(100.0, 50.0));
    assert_eq!(e.item_rect(ItemId(1)), Some(Rect::new(150.0, 0.0, 100.0, 50.0)));
}

#[test]
fn accessibility_position_is_one_based() {
    init_tracing();
    let ts = tiles(4);
    let mut e = engine(GridConfiguration::new().columns(2));
    for t in &ts {
        e.add_item(GridItem::new(t));
    }
    let position = e.item_position(ItemId(1)).map(|p| p.to_string());
    assert_eq!(
        position.as_deref(),
        Some("Item 2 of 4, row 1 of 2, column 2 of 2")
    );
}

#[test]
fn environment_config_drives_the_engine() {
    init_tracing();
    let vars: HashMap<&str, &str> = [
        (ENV_COLUMNS, "3"),
        (ENV_FLOW, "row-reverse"),
        (ENV_SPACING, "4px"),
        (ENV_ANIMATED, "off"),
        (ENV_WRAP_NAV, "maybe"),
    ]
    .into_iter()
    .collect();
    let parsed = GridConfiguration::from_env_with(|key| vars.get(key).map(|v| (*v).to_string()));
    assert_eq!(parsed.errors.len(), 1);
    assert_eq!(parsed.errors[0].field, "wrap_navigation");

    let config = parsed.config;
    assert_eq!(config.column_count(), Some(3));
    assert!(!config.is_animated());
    assert!(config.validate().is_ok());

    let json = serde_json::to_string(&config).expect("serialize config");
    let back: GridConfiguration = serde_json::from_str(&json).expect("deserialize config");
    assert_eq!(back, config);

    let ts = tiles(2);
    let mut e = engine(back);
    for t in &ts {
        e.add_item(GridItem::new(t));
    }
    assert_eq!(origins(&mut e), vec![Cell::new(0, 2), Cell::new(0, 1)]);
}
