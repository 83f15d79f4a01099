#![no_main]

use libfuzzer_sys::fuzz_target;
use ns_trigval::{CutSelector, Electron, TriggerObject};

fuzz_target!(|data: &[u8]| {
    // Keep inputs short; real cut strings are a few dozen bytes.
    if data.len() > 4096 {
        return;
    }
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(sel) = CutSelector::<Electron>::new(text) {
        let e = Electron::new(35.0, -1.2, 0.4, -1);
        let _ = sel.passes(&e);
    }
    if let Ok(sel) = CutSelector::<TriggerObject>::new(text) {
        let _ = sel.evaluate(&TriggerObject::new(11, 30.0, 0.5, -2.0, 0.0));
    }
});
