use std::collections::BTreeMap;
use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::factory::{
    EmitterConfig, EmitterError, EmitterFactory, EmitterHandle, EmitterParam, EmitterParams,
};
use crate::particles::falloff;

/// Strongest link alpha inside a field, before field opacity
const FIELD_LINK_OPACITY: f32 = 0.5;

/// A drifting mote, positioned relative to its field's anchor
#[derive(Debug, Clone)]
pub struct Mote {
    pub offset: Vec2,
    direction: Vec2,
    /// Multiplier on the field speed so motes don't move in lockstep
    pace: f32,
    pub size: f32,
}

/// One self-contained ambient particle field around an anchor
#[derive(Debug, Clone)]
pub struct AmbientField {
    pub anchor: Vec2,
    pub params: EmitterParams,
    half_extent: f32,
    motes: Vec<Mote>,
}

impl AmbientField {
    fn spawn(anchor: Vec2, config: &EmitterConfig, rng: &mut impl Rng) -> Self {
        let half_extent = config.region_size * 0.5;
        let (size_min, size_max) = config.particle_size;

        let motes = (0..config.particle_count)
            .map(|_| {
                let angle = rng.random_range(0.0..TAU);
                Mote {
                    offset: Vec2::new(
                        rng.random_range(-half_extent..half_extent),
                        rng.random_range(-half_extent..half_extent),
                    ),
                    direction: Vec2::from_angle(angle),
                    pace: rng.random_range(0.5..1.0),
                    size: if size_min < size_max {
                        rng.random_range(size_min..size_max)
                    } else {
                        size_min
                    },
                }
            })
            .collect();

        Self {
            anchor,
            params: config.initial_params(),
            half_extent,
            motes,
        }
    }

    /// Drift every mote; motes leaving the region re-enter on the opposite side
    pub fn step(&mut self) {
        let extent = self.half_extent * 2.0;
        for mote in &mut self.motes {
            mote.offset += mote.direction * mote.pace * self.params.speed;
            mote.offset.x = (mote.offset.x + self.half_extent).rem_euclid(extent) - self.half_extent;
            mote.offset.y = (mote.offset.y + self.half_extent).rem_euclid(extent) - self.half_extent;
        }
    }

    pub fn motes(&self) -> &[Mote] {
        &self.motes
    }

    /// Absolute positions of the motes
    pub fn positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.motes.iter().map(move |mote| self.anchor + mote.offset)
    }

    /// Pairs of motes within the link distance and their alpha
    pub fn links(&self) -> Vec<(Vec2, Vec2, f32)> {
        let mut links = Vec::new();
        for (i, a) in self.motes.iter().enumerate() {
            for b in &self.motes[i + 1..] {
                let distance_sq = a.offset.distance_squared(b.offset);
                if let Some(closeness) = falloff(distance_sq, self.params.link_distance) {
                    let alpha = FIELD_LINK_OPACITY * closeness * self.params.opacity;
                    links.push((self.anchor + a.offset, self.anchor + b.offset, alpha));
                }
            }
        }
        links
    }
}

/// The visual backend for emitters: a keyed set of ambient fields
#[derive(Resource, Debug)]
pub struct AmbientFields {
    fields: BTreeMap<EmitterHandle, AmbientField>,
    next_handle: u64,
    max_instances: usize,
    rng: StdRng,
}

impl AmbientFields {
    pub fn new(max_instances: usize, rng: StdRng) -> Self {
        Self {
            fields: BTreeMap::new(),
            next_handle: 0,
            max_instances,
            rng,
        }
    }

    pub fn seeded(max_instances: usize, seed: u64) -> Self {
        Self::new(max_instances, StdRng::seed_from_u64(seed))
    }

    #[cfg(test)]
    pub fn get(&self, handle: EmitterHandle) -> Option<&AmbientField> {
        self.fields.get(&handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AmbientField> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn step(&mut self) {
        for field in self.fields.values_mut() {
            field.step();
        }
    }
}

impl EmitterFactory for AmbientFields {
    fn create(
        &mut self,
        anchor: Vec2,
        config: &EmitterConfig,
    ) -> Result<EmitterHandle, EmitterError> {
        if self.fields.len() >= self.max_instances {
            return Err(EmitterError::CapacityReached {
                limit: self.max_instances,
            });
        }
        if config.particle_count == 0 {
            return Err(EmitterError::InvalidConfig("particle_count is 0".into()));
        }
        if !(config.region_size.is_finite() && config.region_size > 0.0)
            || !config.initial_params().is_finite()
        {
            return Err(EmitterError::InvalidConfig(
                "region size and parameters must be finite".into(),
            ));
        }

        self.next_handle += 1;
        let handle = EmitterHandle(self.next_handle);
        let field = AmbientField::spawn(anchor, config, &mut self.rng);
        self.fields.insert(handle, field);
        Ok(handle)
    }

    fn destroy(&mut self, handle: EmitterHandle) {
        self.fields.remove(&handle);
    }

    fn set_parameter(
        &mut self,
        handle: EmitterHandle,
        param: EmitterParam,
        value: f32,
    ) -> Result<(), EmitterError> {
        let field = self
            .fields
            .get_mut(&handle)
            .ok_or(EmitterError::UnknownInstance(handle))?;
        if !value.is_finite() {
            return Err(EmitterError::InvalidConfig(format!(
                "{:?} must be finite, got {}",
                param, value
            )));
        }
        field.params.set(param, value);
        Ok(())
    }

    fn reposition(&mut self, handle: EmitterHandle, anchor: Vec2) {
        if let Some(field) = self.fields.get_mut(&handle) {
            field.anchor = anchor;
        }
    }
}

/// System: advance every ambient field one tick
pub fn step_ambient_fields(mut fields: ResMut<AmbientFields>) {
    fields.step();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_spawns_motes_inside_region() {
        let mut fields = AmbientFields::seeded(8, 3);
        let config = EmitterConfig::default();

        let handle = fields.create(Vec2::new(300.0, 300.0), &config).unwrap();
        let field = fields.get(handle).unwrap();

        assert_eq!(field.motes().len(), 40);
        assert!(field
            .motes()
            .iter()
            .all(|m| m.offset.abs().max_element() <= 110.0));
        assert_eq!(field.params, config.cold);
    }

    #[test]
    fn test_motes_wrap_at_region_edge() {
        let mut fields = AmbientFields::seeded(8, 11);
        let config = EmitterConfig {
            growth_enabled: false,
            ..Default::default()
        };
        let handle = fields.create(Vec2::ZERO, &config).unwrap();

        for _ in 0..500 {
            fields.step();
        }

        let field = fields.get(handle).unwrap();
        assert!(field
            .motes()
            .iter()
            .all(|m| m.offset.abs().max_element() <= 110.0 + 1e-3));
    }

    #[test]
    fn test_capacity_and_config_errors() {
        let mut fields = AmbientFields::seeded(1, 0);
        let config = EmitterConfig::default();

        fields.create(Vec2::ZERO, &config).unwrap();
        assert_eq!(
            fields.create(Vec2::ZERO, &config),
            Err(EmitterError::CapacityReached { limit: 1 })
        );

        let mut fields = AmbientFields::seeded(4, 0);
        let empty = EmitterConfig {
            particle_count: 0,
            ..Default::default()
        };
        assert!(matches!(
            fields.create(Vec2::ZERO, &empty),
            Err(EmitterError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_parameters_and_reposition() {
        let mut fields = AmbientFields::seeded(4, 0);
        let handle = fields
            .create(Vec2::ZERO, &EmitterConfig::default())
            .unwrap();

        fields
            .set_parameter(handle, EmitterParam::LinkDistance, 55.0)
            .unwrap();
        fields.reposition(handle, Vec2::new(10.0, 20.0));

        let field = fields.get(handle).unwrap();
        assert_eq!(field.params.link_distance, 55.0);
        assert_eq!(field.anchor, Vec2::new(10.0, 20.0));

        fields.destroy(handle);
        assert_eq!(
            fields.set_parameter(handle, EmitterParam::Opacity, 1.0),
            Err(EmitterError::UnknownInstance(handle))
        );
    }

    #[test]
    fn test_links_fade_with_field_opacity() {
        let mut fields = AmbientFields::seeded(4, 9);
        let config = EmitterConfig {
            growth_enabled: false,
            ..Default::default()
        };
        let handle = fields.create(Vec2::ZERO, &config).unwrap();
        let lit = fields.get(handle).unwrap().links();
        assert!(!lit.is_empty());

        fields
            .set_parameter(handle, EmitterParam::Opacity, 0.0)
            .unwrap();
        let dark = fields.get(handle).unwrap().links();
        assert!(dark.iter().all(|&(_, _, alpha)| alpha == 0.0));
    }
}
