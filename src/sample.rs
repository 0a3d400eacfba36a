// Demonstration catalog used by local (mock) mode and for seeding an empty store.

use crate::models::{Color, EngineDetails, FuelType, Listing, Seller, Status, Transmission};
use once_cell::sync::Lazy;

static SAMPLE_LISTINGS: Lazy<Vec<Listing>> = Lazy::new(|| {
    let dealer = |name: &str, phone: &str, email: &str| Seller {
        name: name.to_string(),
        phone: phone.to_string(),
        email: email.to_string(),
        location: "280 Augusta Avenue, Toronto".to_string(),
    };
    let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    vec![
        Listing {
            id: "1".into(),
            title: "Mercedes-Benz E-Class 2023".into(),
            make: "Mercedes-Benz".into(),
            model: "E-Class".into(),
            year: 2023,
            price: 65000,
            mileage: "1,200 Miles".into(),
            fuel_type: Some(FuelType::Petrol),
            transmission: Some(Transmission::Automatic),
            color: Some(Color::Black),
            seats: Some(2),
            images: strings(&["assets/images/portfolio/30.webp"]),
            status: Status::Available,
            description: Some(
                "The 2023 Mercedes-Benz E-Class exemplifies luxury and performance. This model comes with \
                 advanced driver assistance systems, premium interior finishes, and state-of-the-art technology features."
                    .into(),
            ),
            features: strings(&[
                "Automatic Climate Control",
                "Navigation System",
                "Leather Seats",
                "Panoramic Sunroof",
                "LED Headlights",
                "Wireless Charging",
                "360-Degree Camera",
                "Blind Spot Monitoring",
            ]),
            engine_details: Some(EngineDetails {
                engine_type: Some("V6 Turbo".into()),
                displacement: Some("3.0L".into()),
                horsepower: Some("362 hp".into()),
                torque: Some("369 lb-ft".into()),
                cylinders: Some(6),
                engine_layout: Some("Front-Engine".into()),
            }),
            seller: Some(dealer("Jonathan Doe", "+1-654-452-1505", "jonathan@autovault.com")),
            created_at: None,
            updated_at: None,
        },
        Listing {
            id: "2".into(),
            title: "BMW 7 Series 2023".into(),
            make: "BMW".into(),
            model: "7 Series".into(),
            year: 2023,
            price: 95000,
            mileage: "500 Miles".into(),
            fuel_type: Some(FuelType::Hybrid),
            transmission: Some(Transmission::Automatic),
            color: Some(Color::White),
            seats: Some(4),
            images: strings(&["assets/images/portfolio/04.webp"]),
            status: Status::Available,
            description: Some(
                "The all-new BMW 7 Series represents the pinnacle of luxury and innovation. Experience first-class \
                 comfort with executive lounge seating and cutting-edge technology."
                    .into(),
            ),
            features: strings(&[
                "Executive Lounge Seating",
                "31-inch Theatre Screen",
                "BMW Curved Display",
                "Panoramic Sky Lounge LED Roof",
                "Automatic Doors",
                "Crystal Headlights",
                "Massage Seats",
                "Air Suspension",
            ]),
            engine_details: Some(EngineDetails {
                engine_type: Some("Hybrid Inline-6".into()),
                displacement: Some("3.0L".into()),
                horsepower: Some("483 hp".into()),
                torque: Some("516 lb-ft".into()),
                cylinders: Some(6),
                engine_layout: Some("Front-Engine".into()),
            }),
            seller: Some(dealer("Sarah Wilson", "+1-654-452-1506", "sarah@autovault.com")),
            created_at: None,
            updated_at: None,
        },
        Listing {
            id: "3".into(),
            title: "Tesla Model S 2023".into(),
            make: "Tesla".into(),
            model: "Model S".into(),
            year: 2023,
            price: 89900,
            mileage: "0 Miles".into(),
            fuel_type: Some(FuelType::Electric),
            transmission: Some(Transmission::Automatic),
            color: Some(Color::Red),
            seats: Some(5),
            images: strings(&["assets/images/portfolio/05.webp"]),
            status: Status::Available,
            ..Default::default()
        },
        Listing {
            id: "4".into(),
            title: "Toyota RAV4 2023".into(),
            make: "Toyota".into(),
            model: "RAV4".into(),
            year: 2023,
            price: 45000,
            mileage: "100 Miles".into(),
            fuel_type: Some(FuelType::PluginHybrid),
            transmission: Some(Transmission::Automatic),
            color: Some(Color::Silver),
            seats: Some(5),
            images: strings(&["assets/images/portfolio/06.webp"]),
            status: Status::Available,
            ..Default::default()
        },
        Listing {
            id: "5".into(),
            title: "Volkswagen Golf TDI 2023".into(),
            make: "Volkswagen".into(),
            model: "Golf".into(),
            year: 2023,
            price: 35000,
            mileage: "800 Miles".into(),
            fuel_type: Some(FuelType::Diesel),
            transmission: Some(Transmission::Manual),
            color: Some(Color::Blue),
            seats: Some(6),
            images: strings(&["assets/images/portfolio/07.webp"]),
            status: Status::Available,
            ..Default::default()
        },
    ]
});

pub fn sample_listings() -> Vec<Listing> {
    SAMPLE_LISTINGS.clone()
}
