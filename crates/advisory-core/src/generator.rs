//! Advisory text generation.
//!
//! [`AdvisoryGenerator`] is the capability the lifecycle service calls at
//! intake. [`StaticAdvisoryGenerator`] is a fixed lookup table keyed by crop
//! category; other providers can be swapped in without touching the service.

use crate::advisory::CropType;

/// Produces advisory text for a crop and a citizen's problem description.
///
/// Implementations must be total: every input yields text.
pub trait AdvisoryGenerator: Send + Sync {
  fn generate(&self, crop: CropType, problem_description: &str) -> String;
}

/// Deterministic, template-based advisory provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticAdvisoryGenerator;

impl AdvisoryGenerator for StaticAdvisoryGenerator {
  fn generate(&self, crop: CropType, problem_description: &str) -> String {
    let body = template(crop);
    format!(
      "{body}\n\nRegarding the problem you reported (\"{problem_description}\"): \
       please share photographs of the affected plants with your nearest \
       Krishi Vigyan Kendra or agriculture extension officer so the \
       recommendation can be confirmed on site."
    )
  }
}

/// Parse `crop` leniently and generate with [`StaticAdvisoryGenerator`].
pub fn generate_advisory(crop: Option<&str>, problem_description: &str) -> String {
  StaticAdvisoryGenerator.generate(CropType::from_label(crop), problem_description)
}

fn template(crop: CropType) -> &'static str {
  match crop {
    CropType::Rice => {
      "Advisory for rice cultivation:\n\
       1. Maintain 2-5 cm of standing water during the vegetative stage and \
       drain the field 10-15 days before harvest.\n\
       2. Apply nitrogen in three splits: at transplanting, at tillering and \
       at panicle initiation.\n\
       3. Scout weekly for stem borer, leaf folder and brown planthopper; \
       yellowing leaves often point to nitrogen or zinc deficiency."
    }
    CropType::Wheat => {
      "Advisory for wheat cultivation:\n\
       1. Give the first irrigation at crown root initiation, 20-25 days \
       after sowing, and avoid waterlogging.\n\
       2. Apply half the nitrogen at sowing and the rest with the first \
       irrigation.\n\
       3. Watch for yellow rust and aphids during cool, humid spells and \
       use resistant varieties where available."
    }
    CropType::Corn => {
      "Advisory for corn (maize) cultivation:\n\
       1. Keep the field weed-free for the first 45 days and earth up \
       plants at knee height.\n\
       2. Irrigate at tasselling and silking; moisture stress at these \
       stages reduces grain set sharply.\n\
       3. Inspect whorls for fall armyworm and destroy egg masses early."
    }
    CropType::Vegetables => {
      "Advisory for vegetable cultivation:\n\
       1. Rotate crops between families each season to break pest and \
       disease cycles.\n\
       2. Prefer drip irrigation with mulching to save water and keep \
       foliage dry.\n\
       3. Use pheromone and yellow sticky traps before reaching for \
       chemical sprays, and observe pre-harvest intervals."
    }
    CropType::Fruits => {
      "Advisory for fruit orchards:\n\
       1. Prune dead and crossing branches after harvest to improve light \
       and airflow in the canopy.\n\
       2. Apply well-decomposed farmyard manure in a ring around the drip \
       line before the monsoon.\n\
       3. Bag developing fruit where fruit fly pressure is high and remove \
       fallen fruit promptly."
    }
    CropType::Cotton => {
      "Advisory for cotton cultivation:\n\
       1. Maintain recommended plant spacing and avoid excess nitrogen, \
       which encourages sucking pests.\n\
       2. Install pheromone traps to monitor pink bollworm from flowering \
       onwards.\n\
       3. Terminate the crop on time and destroy stalks to cut carry-over \
       of pests to the next season."
    }
    CropType::Other => {
      "General crop advisory:\n\
       1. Get your soil tested and follow the nutrient recommendations on \
       your soil health card.\n\
       2. Use certified seed of varieties suited to your region and \
       season.\n\
       3. Monitor the crop weekly and adopt integrated pest management \
       before using chemical controls."
    }
  }
}
