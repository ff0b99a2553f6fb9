// Copyright @yucwang 2026

use std::sync::Arc;

use crate::core::material::Material;
use crate::core::medium::MediumInterface;
use crate::core::shape::Shape;
use crate::math::spectrum::RGBSpectrum;

/// Shape, material and surrounding media of one scene object.
///
/// An entity with non-black emission also acts as an area light; the scene
/// creates the emitter view when it is built.
#[derive(Clone)]
pub struct Entity {
    shape: Arc<dyn Shape>,
    material: Arc<dyn Material>,
    medium_interface: MediumInterface,
    emission: RGBSpectrum,
    name: Option<String>,
}

impl Entity {
    pub fn new(shape: Arc<dyn Shape>, material: Arc<dyn Material>) -> Self {
        Self {
            shape,
            material,
            medium_interface: MediumInterface::vacuum(),
            emission: RGBSpectrum::default(),
            name: None,
        }
    }

    pub fn with_emission(mut self, emission: RGBSpectrum) -> Self {
        self.emission = emission;
        self
    }

    pub fn with_medium_interface(mut self, medium_interface: MediumInterface) -> Self {
        self.medium_interface = medium_interface;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn shape(&self) -> &Arc<dyn Shape> {
        &self.shape
    }

    pub fn material(&self) -> &dyn Material {
        self.material.as_ref()
    }

    pub fn medium_interface(&self) -> &MediumInterface {
        &self.medium_interface
    }

    pub fn emission(&self) -> RGBSpectrum {
        self.emission
    }

    pub fn is_emissive(&self) -> bool {
        !self.emission.is_black()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
