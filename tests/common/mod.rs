// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use rtlsim::*;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `msg` and `val` flow in, `rdy` flows back out.
pub fn val_rdy(nbits: usize) -> BundleType {
    BundleType::new()
        .input("msg", nbits)
        .input("val", 1)
        .output("rdy", 1)
}

/// Single-entry queue with val/rdy handshakes on both sides.
pub fn port_bundle_queue(nbits: usize) -> Module {
    let m = Module::new("PortBundleQueue");
    m.add_bundle("enq", &val_rdy(nbits));
    m.add_bundle("deq", &val_rdy(nbits).flip());
    let full = m.add_wire("full", 1);
    let wen = m.add_wire("wen", 1);

    let enq_msg = m.get_signal("enq.msg");
    let enq_val = m.get_signal("enq.val");
    let enq_rdy = m.get_signal("enq.rdy");
    let deq_msg = m.get_signal("deq.msg");
    let deq_val = m.get_signal("deq.val");
    let deq_rdy = m.get_signal("deq.rdy");
    let reset = m.reset();

    {
        let (full, wen, enq_val, enq_rdy, deq_val) = (
            full.clone(),
            wen.clone(),
            enq_val.clone(),
            enq_rdy.clone(),
            deq_val.clone(),
        );
        m.comb("comb")
            .reads([&full, &enq_val])
            .writes([&wen, &enq_rdy, &deq_val])
            .body(move |f| {
                f.set(&wen, !f.get(&full) & f.get(&enq_val));
                f.set(&enq_rdy, !f.get(&full));
                f.set(&deq_val, f.get(&full));
            });
    }

    m.seq("seq")
        .reads([&wen, &enq_msg, &reset, &deq_rdy, &deq_val, &enq_rdy, &enq_val])
        .writes([&deq_msg, &full])
        .body(move |f| {
            if f.get_bool(&wen) {
                f.set(&deq_msg, f.get(&enq_msg));
            }

            if f.get_bool(&reset) {
                f.set(&full, false);
            } else if f.get_bool(&deq_rdy) && f.get_bool(&deq_val) {
                f.set(&full, false);
            } else if f.get_bool(&enq_rdy) && f.get_bool(&enq_val) {
                f.set(&full, true);
            } else {
                f.set(&full, f.get(&full));
            }
        });

    m.set_line_trace(|t| {
        format!(
            "{} {} {} () {} {} {}",
            t.get("enq.msg"),
            t.get("enq.val"),
            t.get("enq.rdy"),
            t.get("deq.msg"),
            t.get("deq.val"),
            t.get("deq.rdy")
        )
    });

    m
}

/// Two queues back to back, connected bundle to bundle.
pub fn two_queues(nbits: usize) -> Module {
    let m = Module::new("TwoQueues");
    let in_ = m.add_bundle("in_", &val_rdy(nbits));
    let out = m.add_bundle("out", &val_rdy(nbits).flip());

    let q1 = m.instantiate(&port_bundle_queue(nbits), Some("q1"));
    let q2 = m.instantiate(&port_bundle_queue(nbits), Some("q2"));

    m.connect_bundles(&in_, &q1.get_bundle("enq"));
    m.connect_bundles(&q1.get_bundle("deq"), &q2.get_bundle("enq"));
    m.connect_bundles(&q2.get_bundle("deq"), &out);

    m.set_line_trace(|t| format!("{} | {}", t.submodule("q1"), t.submodule("q2")));

    m
}

/// Register with enable and synchronous reset to `reset_value`.
pub fn reg_en_rst(nbits: usize, reset_value: u64) -> Module {
    let m = Module::new("RegEnRst");
    let in_ = m.add_input("in_", nbits);
    let en = m.add_input("en", 1);
    let out = m.add_output("out", nbits);
    let reset = m.reset();

    m.seq("seq")
        .reads([&reset, &en, &in_])
        .writes([&out])
        .body(move |f| {
            if f.get_bool(&reset) {
                f.set(&out, reset_value);
            } else if f.get_bool(&en) {
                f.set(&out, f.get(&in_));
            }
        });

    m
}

pub fn round_robin_arbiter(nreqs: usize) -> Module {
    arbiter("RoundRobinArbiter", nreqs, false)
}

/// The priority register only advances while `en` is high.
pub fn round_robin_arbiter_en(nreqs: usize) -> Module {
    arbiter("RoundRobinArbiterEn", nreqs, true)
}

fn arbiter(name: &str, nreqs: usize, with_enable: bool) -> Module {
    let nreqs_x2 = nreqs * 2;

    let m = Module::new(name);
    let en = with_enable.then(|| m.add_input("en", 1));
    let reqs = m.add_input("reqs", nreqs);
    let grants = m.add_output("grants", nreqs);

    let priority_en = m.add_wire("priority_en", 1);

    let priority_reg = m.instantiate(&reg_en_rst(nreqs, 1), Some("priority_reg"));
    m.connect(&priority_reg.get_signal("en"), &priority_en);
    if nreqs > 1 {
        m.connect(
            &priority_reg.get_signal("in_").slice(nreqs - 1, 1),
            &grants.slice(nreqs - 2, 0),
        );
    }
    m.connect(&priority_reg.get_signal("in_").bit(0), &grants.bit(nreqs - 1));
    let priority = priority_reg.get_signal("out");

    let kills = m.add_wire("kills", nreqs_x2 + 1);
    let priority_int = m.add_wire("priority_int", nreqs_x2);
    let reqs_int = m.add_wire("reqs_int", nreqs_x2);
    let grants_int = m.add_wire("grants_int", nreqs_x2);

    let mut writes = vec![&kills, &priority_int, &reqs_int, &grants_int, &grants];
    if !with_enable {
        writes.push(&priority_en);
    }

    {
        let (grants, priority_en) = (grants.clone(), priority_en.clone());
        let (kills, priority_int, reqs_int, grants_int) = (
            kills.clone(),
            priority_int.clone(),
            reqs_int.clone(),
            grants_int.clone(),
        );
        m.comb("comb_arbitrate")
            .reads([&reqs, &priority])
            .writes(writes)
            .body(move |f| {
                f.set(&kills.bit(0), 1);

                f.set(&priority_int.range(0..nreqs), f.get(&priority));
                f.set(&priority_int.range(nreqs..nreqs_x2), 0);
                f.set(&reqs_int.range(0..nreqs), f.get(&reqs));
                f.set(&reqs_int.range(nreqs..nreqs_x2), f.get(&reqs));

                // kill chain
                for i in 0..nreqs_x2 {
                    let has_priority = f.get_bool(&priority_int.bit(i));

                    if has_priority {
                        f.set(&grants_int.bit(i), f.get(&reqs_int.bit(i)));
                    } else {
                        f.set(
                            &grants_int.bit(i),
                            !f.get(&kills.bit(i)) & f.get(&reqs_int.bit(i)),
                        );
                    }

                    if has_priority {
                        f.set(&kills.bit(i + 1), f.get(&grants_int.bit(i)));
                    } else {
                        f.set(
                            &kills.bit(i + 1),
                            f.get(&kills.bit(i)) | f.get(&grants_int.bit(i)),
                        );
                    }
                }

                for i in 0..nreqs {
                    f.set(
                        &grants.bit(i),
                        f.get(&grants_int.bit(i)) | f.get(&grants_int.bit(nreqs + i)),
                    );
                }

                if !with_enable {
                    f.set(&priority_en, !f.get(&grants).is_zero());
                }
            });
    }

    if let Some(en) = en {
        let (grants, priority_en) = (grants.clone(), priority_en.clone());
        m.comb("comb_feedback")
            .reads([&grants, &en])
            .writes([&priority_en])
            .body(move |f| {
                f.set(&priority_en, !f.get(&grants).is_zero() && f.get_bool(&en));
            });
    }

    m.set_line_trace(|t| format!("{} | {}", t.get("reqs"), t.get("grants")));

    m
}

/// Builds, elaborates and resets a simulator for `top`.
pub fn simulator(top: &Module) -> Simulator {
    let mut sim = Simulator::new(top, SimConfig::default());
    sim.elaborate().unwrap();
    sim.reset().unwrap();
    sim
}

/// Names and widths of a list of signals, for comparison with literals.
pub fn names_and_widths(signals: &[&SignalInfo]) -> Vec<(String, usize)> {
    signals
        .iter()
        .map(|info| (info.name().to_string(), info.width()))
        .collect()
}
