//! Built-in species table and fallback breed catalogs.
//!
//! Adding a species is a data change here: append a [`SpeciesDefinition`] to
//! [`BUILTIN_SPECIES`]. Iteration order of that table is the registry order, which the
//! first-match species detector depends on.

use common::{ModelStatus, NormalizationScheme, SpeciesId};
use std::ops::RangeInclusive;

/// Static description of one species, turned into a `SpeciesConfig` at startup.
#[derive(Debug)]
pub struct SpeciesDefinition {
    pub species: SpeciesId,
    pub display_name: &'static str,
    /// ImageNet class ranges counted as evidence for this species.
    pub class_ranges: &'static [RangeInclusive<usize>],
    pub confidence_threshold: f32,
    pub status: ModelStatus,
    pub model_file: Option<&'static str>,
    pub labels_file: Option<&'static str>,
    /// Scheme the breed model was trained with.
    pub normalization: NormalizationScheme,
    pub description: &'static str,
    /// Catalog used when no labels file is configured or it cannot be read.
    pub fallback_breeds: &'static [&'static str],
}

impl SpeciesDefinition {
    pub fn class_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.class_ranges.iter().flat_map(|r| r.clone())
    }
}

pub static BUILTIN_SPECIES: [SpeciesDefinition; 4] = [
    SpeciesDefinition {
        species: SpeciesId::Dog,
        display_name: "Dogs",
        class_ranges: &[151..=268],
        confidence_threshold: 0.15,
        status: ModelStatus::Trained,
        model_file: Some("dog_breed_model.onnx"),
        labels_file: Some("class_labels.json"),
        normalization: NormalizationScheme::ScaledOffset,
        description: "Trained on the Stanford Dogs Dataset - 120+ breeds",
        fallback_breeds: DEFAULT_DOG_BREEDS,
    },
    SpeciesDefinition {
        species: SpeciesId::Cat,
        display_name: "Cats",
        class_ranges: &[281..=285],
        confidence_threshold: 0.20,
        status: ModelStatus::Placeholder,
        model_file: None,
        labels_file: None,
        normalization: NormalizationScheme::CenteredUnit,
        description: "Model in development - common cat breeds",
        fallback_breeds: CAT_BREEDS,
    },
    SpeciesDefinition {
        species: SpeciesId::Bird,
        display_name: "Birds",
        class_ranges: &[80..=100, 127..=146],
        confidence_threshold: 0.18,
        status: ModelStatus::Placeholder,
        model_file: None,
        labels_file: None,
        normalization: NormalizationScheme::CenteredUnit,
        description: "Model in development - domestic and exotic birds",
        fallback_breeds: BIRD_BREEDS,
    },
    SpeciesDefinition {
        species: SpeciesId::Rabbit,
        display_name: "Rabbits",
        class_ranges: &[330..=331],
        confidence_threshold: 0.25,
        status: ModelStatus::Placeholder,
        model_file: None,
        labels_file: None,
        normalization: NormalizationScheme::CenteredUnit,
        description: "Model in development - domestic rabbit breeds",
        fallback_breeds: RABBIT_BREEDS,
    },
];

/// Used when `class_labels.json` is missing or malformed.
#[rustfmt::skip]
pub const DEFAULT_DOG_BREEDS: &[&str] = &[
    "Chihuahua", "Maltese dog", "Pekinese", "Shih-Tzu", "Beagle",
    "Afghan hound", "Basset", "Bloodhound", "Bluetick", "Black-and-tan coonhound",
    "Walker hound", "English foxhound", "Redbone", "Borzoi", "Irish wolfhound",
    "Italian greyhound", "Whippet", "Ibizan hound", "Norwegian elkhound", "Otterhound",
    "Saluki", "Scottish deerhound", "Weimaraner", "Staffordshire bullterrier", "American Staffordshire terrier",
    "Bedlington terrier", "Border terrier", "Kerry blue terrier", "Irish terrier", "Norfolk terrier",
    "Norwich terrier", "Yorkshire terrier", "Wire-haired fox terrier", "Lakeland terrier", "Sealyham terrier",
    "Airedale", "Cairn", "Australian terrier", "Dandie Dinmont", "Boston bull",
    "Miniature schnauzer", "Giant schnauzer", "Standard schnauzer", "Scotch terrier", "Tibetan terrier",
    "Silky terrier", "Soft-coated wheaten terrier", "West Highland white terrier",
];

// Popular breeds first: the placeholder ranking uses the head of the list.
#[rustfmt::skip]
pub const CAT_BREEDS: &[&str] = &[
    "Persian", "Maine Coon", "British Shorthair", "Ragdoll", "Bengal",
    "Abyssinian", "Birman", "Oriental Shorthair", "Sphynx", "Devon Rex",
    "American Shorthair", "Scottish Fold", "Siamese", "Norwegian Forest Cat", "Russian Blue",
    "Exotic Shorthair", "Cornish Rex", "Selkirk Rex", "Manx", "Turkish Angora",
    "Burmese", "Tonkinese", "Bombay", "Chartreux", "Turkish Van",
    "Balinese", "Javanese", "Ocicat", "Egyptian Mau", "Korat",
    "Singapura", "LaPerm", "Munchkin", "Savannah", "Pixie-bob",
    "American Curl", "Japanese Bobtail", "Havana Brown", "Somali", "Nebelung",
    "Domestic Shorthair", "Domestic Longhair", "Mixed Breed",
];

#[rustfmt::skip]
pub const BIRD_BREEDS: &[&str] = &[
    "Budgerigar", "Cockatiel", "Lovebird", "Conure", "African Grey Parrot",
    "Amazon Parrot", "Macaw", "Cockatoo", "Caique", "Eclectus",
    "Quaker Parrot", "Senegal Parrot", "Meyer's Parrot", "Pionus", "Lorikeet",
    "Canary", "Goldfinch", "Zebra Finch", "Society Finch", "Gouldian Finch",
    "Java Sparrow", "Waxbill", "Cordon Bleu", "Star Finch", "Owl Finch",
    "Dove", "Pigeon", "Chicken", "Duck", "Goose",
    "Quail", "Pheasant", "Guinea Fowl", "Turkey", "Peacock",
    "Toucan", "Hornbill", "Mynah", "Starling", "Robin",
    "Cardinal", "Blue Jay", "Crow", "Raven", "Magpie",
    "Songbird", "Waterfowl", "Game Bird", "Exotic Bird", "Mixed Species",
];

#[rustfmt::skip]
pub const RABBIT_BREEDS: &[&str] = &[
    "Flemish Giant", "Continental Giant", "Giant Chinchilla", "Checkered Giant", "French Lop",
    "English Lop", "Giant Angora", "New Zealand", "Californian", "Champagne D'Argent",
    "Dutch", "Mini Lop", "Holland Lop", "Rex", "Mini Rex",
    "English Angora", "French Angora", "Satin Angora", "American Fuzzy Lop", "Lionhead",
    "Jersey Wooly", "English Spot", "Harlequin", "Rhinelander", "Thrianta",
    "Netherland Dwarf", "Polish", "Himalayan", "Florida White", "Havana",
    "Tan", "Silver", "Lilac", "American Sable", "Smoke Pearl",
    "Belgian Hare", "Blanc de Hotot", "Cinnamon", "Crème D'Argent", "Silver Fox",
    "Standard Chinchilla", "Palomino", "Satin", "Silver Marten", "Velveteen Lop",
    "Lop-eared", "Upright-eared", "Angora Type", "Rex Type", "Mixed Breed",
];
