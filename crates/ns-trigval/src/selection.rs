//! Per-role object selection.
//!
//! A role without a configured selection is not evaluated at all: the
//! selectors return an empty collection rather than accepting everything.

use crate::expr::CutSelector;
use crate::kinematics::Point3;
use crate::objects::{Electron, FilterTag, TriggerObject, TriggerSummary};

/// Selection applied to reconstructed electrons for one role.
#[derive(Debug, Clone)]
pub struct ElectronSelection {
    /// Cut expression every selected electron must pass.
    pub cut: CutSelector<Electron>,
    /// Maximum |d0| of the GSF track w.r.t. the beam spot.
    pub d0_cut: Option<f64>,
    /// Maximum |dz| of the GSF track w.r.t. the beam spot.
    pub z0_cut: Option<f64>,
}

impl ElectronSelection {
    /// Selection with only a cut expression.
    pub fn new(cut: CutSelector<Electron>) -> Self {
        Self { cut, d0_cut: None, z0_cut: None }
    }

    fn accepts(&self, electron: &Electron, beam_spot: &Point3) -> bool {
        let Some(track) = electron.gsf_track else {
            return false;
        };
        if !self.cut.passes(electron) {
            return false;
        }
        if let Some(d0) = self.d0_cut
            && track.dxy(beam_spot).abs() >= d0
        {
            return false;
        }
        if let Some(z0) = self.z0_cut
            && track.dz(beam_spot).abs() >= z0
        {
            return false;
        }
        true
    }
}

/// Electrons with a GSF track passing `selection`, in input order.
///
/// `None` means the role is not configured: nothing is selected.
pub fn select_electrons<'a>(
    electrons: &'a [Electron],
    beam_spot: &Point3,
    selection: Option<&ElectronSelection>,
) -> Vec<&'a Electron> {
    let Some(selection) = selection else {
        return Vec::new();
    };
    electrons.iter().filter(|e| selection.accepts(e, beam_spot)).collect()
}

/// Trigger objects accepted by `filter` that pass `selector`, in the
/// filter's key order.
///
/// `None` means no trigger selection is configured: nothing is selected. An
/// unknown filter also selects nothing.
pub fn select_trigger_objects<'a>(
    summary: &'a TriggerSummary,
    filter: &FilterTag,
    selector: Option<&CutSelector<TriggerObject>>,
) -> Vec<&'a TriggerObject> {
    let Some(selector) = selector else {
        return Vec::new();
    };
    let Some(index) = summary.filter_index(filter) else {
        log::debug!("filter {}::{} not in trigger summary", filter.label, filter.process);
        return Vec::new();
    };
    let objects = summary.objects();
    summary
        .filter_keys(index)
        .iter()
        .filter_map(|&key| {
            let obj = objects.get(key);
            if obj.is_none() {
                log::debug!("filter {} key {key} outside the object pool", filter.label);
            }
            obj
        })
        .filter(|obj| selector.passes(obj))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Track;

    fn electrons() -> Vec<Electron> {
        vec![
            Electron::new(30.0, 0.5, 0.0, 1),
            Electron::new(10.0, 0.5, 1.0, -1),
            Electron::new(45.0, -1.0, 2.0, -1).with_track(None),
            Electron::new(50.0, 2.0, -2.0, 1),
        ]
    }

    #[test]
    fn unconfigured_role_selects_nothing() {
        let all = electrons();
        assert!(select_electrons(&all, &Point3::default(), None).is_empty());
    }

    #[test]
    fn cut_and_track_requirement() {
        let all = electrons();
        let sel = ElectronSelection::new(CutSelector::new("pt > 20").unwrap());
        let picked = select_electrons(&all, &Point3::default(), Some(&sel));
        let pts: Vec<f64> = picked.iter().map(|e| e.pt).collect();
        assert_eq!(pts, vec![30.0, 50.0]);

        let everything = ElectronSelection::new(CutSelector::new("").unwrap());
        assert_eq!(select_electrons(&all, &Point3::default(), Some(&everything)).len(), 3);
    }

    #[test]
    fn impact_parameter_cuts() {
        let mut displaced = Track::from_direction(1, 30.0, 0.0, 0.0);
        displaced.vertex = Point3::new(0.0, 0.3, 0.0);
        let all = vec![
            Electron::new(30.0, 0.0, 0.0, 1),
            Electron::new(30.0, 0.0, 0.0, 1).with_track(Some(displaced)),
        ];
        let sel = ElectronSelection {
            cut: CutSelector::new("").unwrap(),
            d0_cut: Some(0.2),
            z0_cut: Some(1.0),
        };
        assert_eq!(select_electrons(&all, &Point3::default(), Some(&sel)).len(), 1);
    }

    #[test]
    fn trigger_objects_follow_filter_keys() {
        let summary = TriggerSummary::new(vec![
            TriggerObject::new(11, 20.0, 0.0, 0.0, 0.0),
            TriggerObject::new(11, 35.0, 1.0, 0.0, 0.0),
            TriggerObject::new(-11, 40.0, -1.0, 0.0, 0.0),
        ])
        .with_filter(FilterTag::new("hltEle27Filter", "HLT"), vec![2, 0, 1, 9]);
        let tag = FilterTag::new("hltEle27Filter", "HLT");
        let cut = CutSelector::new("pt > 25").unwrap();

        let picked = select_trigger_objects(&summary, &tag, Some(&cut));
        let pts: Vec<f64> = picked.iter().map(|o| o.pt).collect();
        assert_eq!(pts, vec![40.0, 35.0]);

        assert!(select_trigger_objects(&summary, &tag, None).is_empty());
        let unknown = FilterTag::new("hltOther", "HLT");
        assert!(select_trigger_objects(&summary, &unknown, Some(&cut)).is_empty());
    }
}
