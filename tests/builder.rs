// SPDX-License-Identifier: Apache-2.0

mod common;

use common::*;
use indexmap::IndexMap;
use rtlsim::*;

#[test]
#[should_panic(expected = "Signal X.y already exists.")]
fn duplicate_signal() {
    let m = Module::new("X");
    m.add_input("y", 1);
    m.add_output("y", 2);
}

#[test]
#[should_panic(expected = "Signal X.clk already exists.")]
fn implicit_clock_name_is_taken() {
    let m = Module::new("X");
    m.add_input("clk", 1);
}

#[test]
#[should_panic(expected = "Signal X.w must be at least one bit wide.")]
fn zero_width_signal() {
    let m = Module::new("X");
    m.add_wire("w", 0);
}

#[test]
#[should_panic(expected = "Signal X.nope does not exist")]
fn unknown_signal() {
    let m = Module::new("X");
    m.get_signal("nope");
}

#[test]
#[should_panic(expected = "msb must be less than the width of the signal.")]
fn slice_past_msb() {
    let m = Module::new("X");
    m.add_wire("w", 4).slice(4, 0);
}

#[test]
#[should_panic(expected = "lsb must be less than or equal to msb.")]
fn slice_with_reversed_bounds() {
    let m = Module::new("X");
    m.add_wire("w", 4).slice(1, 2);
}

#[test]
#[should_panic(expected = "is clockless and has no reset input.")]
fn reset_of_clockless_module() {
    Module::clockless("X").reset();
}

#[test]
#[should_panic(expected = "Module Top.a is already instantiated in Top.")]
fn instantiating_a_child_twice() {
    let top = Module::clockless("Top");
    let leaf = Module::clockless("Leaf");
    top.instantiate(&leaf, Some("a"));
    top.instantiate(&leaf, Some("b"));
}

#[test]
#[should_panic(expected = "Submodule Top.a already exists")]
fn duplicate_instance_name() {
    let top = Module::clockless("Top");
    top.instantiate(&Module::clockless("Leaf"), Some("a"));
    top.instantiate(&Module::clockless("Leaf"), Some("a"));
}

#[test]
#[should_panic(expected = "Cannot instantiate A inside itself.")]
fn adoption_cycle() {
    let a = Module::clockless("A");
    let b = Module::clockless("B");
    a.instantiate(&b, Some("b"));
    b.instantiate(&a, Some("a"));
}

#[test]
#[should_panic(expected = "Cannot instantiate A inside itself.")]
fn instantiating_itself() {
    let a = Module::clockless("A");
    a.instantiate(&a, None);
}

#[test]
#[should_panic(expected = "Module X has been elaborated and can no longer be modified.")]
fn adding_signal_after_elaboration() {
    let m = Module::clockless("X");
    m.elaborate().unwrap();
    m.add_wire("w", 1);
}

#[test]
#[should_panic(expected = "has been elaborated and can no longer be modified.")]
fn connecting_after_elaboration() {
    let m = port_bundle_queue(8);
    m.elaborate().unwrap();
    m.connect(&m.get_signal("full"), &m.get_signal("wen"));
}

#[test]
#[should_panic(expected = "Module TwoQueues.q1 has been elaborated and can no longer be modified.")]
fn modifying_child_after_elaboration() {
    let m = two_queues(8);
    m.elaborate().unwrap();
    m.get_submodule("q1").add_wire("extra", 1);
}

#[test]
#[should_panic(expected = "cannot be elaborated on its own.")]
fn elaborating_a_submodule() {
    let m = two_queues(8);
    m.get_submodule("q2").elaborate().ok();
}

#[test]
#[should_panic(expected = "Block X.comb already exists.")]
fn duplicate_block() {
    let m = Module::new("X");
    let w = m.add_wire("w", 1);
    m.comb("comb").write(&w).body(|_| {});
    let _ = m.seq("comb");
}

#[test]
#[should_panic(expected = "declares overlapping writes to")]
fn overlapping_block_writes() {
    let m = Module::new("X");
    let w = m.add_wire("w", 8);
    let _ = m.comb("comb").write(&w.slice(5, 2)).write(&w.bit(2));
}

#[test]
#[should_panic(expected = "Bundle b already exists in module X")]
fn duplicate_bundle() {
    let m = Module::clockless("X");
    m.add_input("a_data", 8);
    m.def_bundle_from_prefix("b", "a_");
    m.def_bundle_from_prefix("b", "a_");
}

#[test]
#[should_panic(expected = "Bundle X.nope does not exist")]
fn unknown_bundle() {
    Module::clockless("X").get_bundle("nope");
}

#[test]
#[should_panic(expected = "Bundle field msg is declared twice.")]
fn duplicate_bundle_field() {
    let _ = BundleType::new().input("msg", 8).output("msg", 8);
}

#[test]
#[should_panic(expected = "Empty bundle definition for X.b")]
fn empty_prefix_bundle() {
    let m = Module::clockless("X");
    m.add_input("a_data", 8);
    m.def_bundle_from_prefix("b", "c_");
}

#[test]
fn bundle_type_flip() {
    let t = val_rdy(8);
    assert_eq!(t.width(), 10);
    assert_eq!(
        t.flip().fields(),
        &[
            ("msg".to_string(), IO::Output(8)),
            ("val".to_string(), IO::Output(1)),
            ("rdy".to_string(), IO::Input(1)),
        ]
    );
    assert_eq!(t.flip().flip(), t);
}

#[test]
fn bundle_from_prefix() {
    let m = Module::clockless("X");
    m.add_input("a_data", 8);
    m.add_input("a_valid", 1);
    m.add_output("a_ready", 1);
    m.add_input("b_data", 8);

    let a = m.def_bundle_from_prefix("a", "a_");
    assert_eq!(a.fields(), vec!["data", "valid", "ready"]);
    assert_eq!(a.get("data").get_signal().name(), "a_data");
    assert_eq!(a.width(), 10);
    assert!(m.has_bundle("a"));
    assert!(!m.has_bundle("b"));
}

#[test]
fn bundle_from_regex() {
    let m = Module::clockless("X");
    m.add_input("data_in", 8);
    m.add_input("valid_in", 1);
    m.add_output("data_out", 8);

    let inputs = m.def_bundle_from_regex("inputs", "^(.*)_in$", "$1");
    assert_eq!(inputs.fields(), vec!["data", "valid"]);
    assert_eq!(
        inputs
            .iter()
            .map(|(field, slice)| (field, slice.get_signal().name().to_string()))
            .collect::<Vec<_>>(),
        vec![
            ("data".to_string(), "data_in".to_string()),
            ("valid".to_string(), "valid_in".to_string())
        ]
    );
    assert_eq!(
        m.get_bundles().iter().map(|b| b.name().to_string()).collect::<Vec<_>>(),
        vec!["inputs"]
    );
}

#[test]
fn bundles_over_partial_slices() {
    let leaf = Module::clockless("Pair");
    let lo = leaf.add_input("lo", 4);
    let hi = leaf.add_input("hi", 4);
    let y = leaf.add_output("y", 8);
    leaf.connect_all(&[(lo, y.slice(3, 0)), (hi, y.slice(7, 4))]);
    let pair = leaf.def_bundle_from_regex("pair", "^(lo|hi)$", "$1");

    let top = Module::clockless("Top");
    top.add_input("bus", 8);
    let out = top.add_output("out", 8);
    let mut mapping = IndexMap::new();
    mapping.insert("lo".to_string(), ("bus".to_string(), 3, 0));
    mapping.insert("hi".to_string(), ("bus".to_string(), 7, 4));
    let halves = top.def_bundle("halves", mapping);
    assert_eq!(halves.signals().iter().map(|s| s.width()).sum::<usize>(), 8);

    let c = top.instantiate(&leaf, Some("c"));
    assert_eq!(pair.get_module(), c);
    top.connect_bundles(&halves, &pair);
    top.connect(&c.get_signal("y"), &out);

    let mut sim = Simulator::new(&top, SimConfig::default());
    sim.elaborate().unwrap();
    let design = sim.design().unwrap();
    assert_eq!(
        design.top().connection_names(),
        vec![
            ("bus[3:0]".to_string(), "c.lo".to_string()),
            ("bus[7:4]".to_string(), "c.hi".to_string()),
            ("c.y".to_string(), "out".to_string()),
        ]
    );
    assert_eq!(
        design.module("c").unwrap().connection_names(),
        vec![
            ("lo".to_string(), "y[3:0]".to_string()),
            ("hi".to_string(), "y[7:4]".to_string()),
        ]
    );

    sim.set("bus", 0xa5u64).unwrap();
    sim.eval_combinational().unwrap();
    assert_eq!(sim.get("out").unwrap().to_u64(), 0xa5);
}

#[test]
fn tree_navigation() {
    let m = two_queues(8);
    assert!(m.has_submodule("q1"));
    assert!(!m.has_submodule("q3"));
    assert_eq!(
        m.get_submodules()
            .iter()
            .map(|q| q.get_inst_name().unwrap())
            .collect::<Vec<_>>(),
        vec!["q1", "q2"]
    );

    let q1 = m.get_submodule("q1");
    assert_eq!(q1.get_name(), "PortBundleQueue");
    assert_eq!(q1.get_parent(), Some(m.clone()));
    assert_eq!(m.get_parent(), None);
    assert_eq!(
        q1.get_blocks(),
        vec![
            ("comb".to_string(), BlockKind::Combinational),
            ("seq".to_string(), BlockKind::Sequential)
        ]
    );
    assert_eq!(
        q1.get_signals(Some("deq."))
            .iter()
            .map(|s| s.name().to_string())
            .collect::<Vec<_>>(),
        vec!["deq.msg", "deq.val", "deq.rdy"]
    );
    assert_eq!(q1.get_signals(None).len(), 10);
    assert_eq!(q1.get_signal_slice("deq.msg", 3, 0).width(), 4);
    assert!(!m.is_frozen());
}

#[test]
fn slice_helpers() {
    let m = Module::clockless("X");
    let bus = m.add_wire("bus", 16);

    let bytes = bus.slice(15, 0).subdivide(2);
    assert_eq!((bytes[0].msb(), bytes[0].lsb()), (7, 0));
    assert_eq!((bytes[1].msb(), bytes[1].lsb()), (15, 8));

    let nibble = bytes[1].slice_relative(4, 4);
    assert_eq!((nibble.msb(), nibble.lsb()), (15, 12));
    assert!(!nibble.is_whole());
    assert!(bus.slice(15, 0).is_whole());
    assert_eq!(bus.range(4..8), bus.slice(7, 4));
    assert_eq!(bus.bit(3).width(), 1);
}

#[test]
#[should_panic(expected = "Cannot subdivide X.bus[7:0] into 3 equal parts.")]
fn uneven_subdivision() {
    let m = Module::clockless("X");
    m.add_wire("bus", 8).slice(7, 0).subdivide(3);
}
