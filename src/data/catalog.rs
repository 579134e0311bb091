/// Choices offered by the shop, amenity and CBTC selectors, as `(tag value, label)`.

pub const SHOP_TYPES: &[(&str, &str)] = &[
    ("bakery", "Bakery"),
    ("cafe", "Cafe"),
    ("supermarket", "Supermarket"),
    ("clothes", "Clothes Shop"),
    ("electronics", "Electronics Store"),
    ("hairdresser", "Hairdresser"),
    ("pharmacy", "Pharmacy"),
    ("florist", "Florist"),
    ("bookshop", "Bookshop"),
    ("car_repair", "Car Repair"),
    ("convenience", "Convenience Store"),
    ("kiosk", "Kiosk"),
    ("laundry", "Laundry"),
    ("newsagent", "Newsagent"),
    ("pet_shop", "Pet Shop"),
    ("travel_agency", "Travel Agency"),
    ("tyres", "Tyres"),
    ("variety_store", "Variety Store"),
    ("wholesale", "Wholesale"),
];

pub const AMENITY_TYPES: &[(&str, &str)] = &[
    ("restaurant", "Restaurant"),
    ("cafe", "Cafe"),
    ("bar", "Bar"),
    ("pub", "Pub"),
    ("fast_food", "Fast Food"),
    ("bank", "Bank"),
    ("atm", "ATM"),
    ("post_office", "Post Office"),
    ("pharmacy", "Pharmacy"),
    ("hospital", "Hospital"),
    ("clinic", "Clinic"),
    ("school", "School"),
    ("university", "University"),
    ("library", "Library"),
    ("parking", "Parking"),
    ("toilet", "Toilet"),
    ("fountain", "Fountain"),
    ("recycling", "Recycling"),
    ("waste_basket", "Waste Basket"),
    ("bench", "Bench"),
    ("shelter", "Shelter"),
    ("bus_station", "Bus Station"),
    ("taxi", "Taxi Stand"),
    ("charging_station", "Charging Station"),
    ("bicycle_parking", "Bicycle Parking"),
    ("car_wash", "Car Wash"),
    ("fuel", "Fuel Station"),
    ("kindergarten", "Kindergarten"),
    ("marketplace", "Marketplace"),
    ("place_of_worship", "Place of Worship"),
    ("police", "Police Station"),
    ("fire_station", "Fire Station"),
    ("town_hall", "Town Hall"),
    ("community_centre", "Community Centre"),
    ("arts_centre", "Arts Centre"),
    ("theatre", "Theatre"),
    ("cinema", "Cinema"),
    ("nightclub", "Nightclub"),
    ("casino", "Casino"),
    ("brothel", "Brothel"),
    ("stripclub", "Stripclub"),
    ("swimming_pool", "Swimming Pool"),
    ("gym", "Gym"),
    ("sauna", "Sauna"),
    ("spa", "Spa"),
    ("public_bath", "Public Bath"),
    ("dojo", "Dojo"),
    ("social_facility", "Social Facility"),
    ("childcare", "Childcare"),
    ("nursing_home", "Nursing Home"),
    ("veterinary", "Veterinary"),
    ("animal_boarding", "Animal Boarding"),
    ("animal_shelter", "Animal Shelter"),
    ("grave_yard", "Grave Yard"),
    ("crematorium", "Crematorium"),
    ("funeral_hall", "Funeral Hall"),
    ("hunting_stand", "Hunting Stand"),
    ("ranger_station", "Ranger Station"),
    ("research_institute", "Research Institute"),
    ("embassy", "Embassy"),
    ("consulate", "Consulate"),
];

pub const CBTC_KEY: &str = "railway:cbtc";

pub const CBTC_TYPES: &[(&str, &str)] = &[
    ("yes", "Yes"),
    ("no", "No"),
    ("unknown", "Unknown"),
];

pub fn label_for<'a>(choices: &'a [(&str, &'a str)], value: &str) -> Option<&'a str> {
    choices
        .iter()
        .find(|(choice, _)| *choice == value)
        .map(|(_, label)| *label)
}

/// Free-text inputs of the structured form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    HouseNumber,
    Street,
    City,
    State,
    Postcode,
    Country,
    Phone,
    Website,
    Email,
    OpeningHours,
    Cuisine,
}

impl FormField {
    pub const ALL: [FormField; 12] = [
        FormField::Name,
        FormField::HouseNumber,
        FormField::Street,
        FormField::City,
        FormField::State,
        FormField::Postcode,
        FormField::Country,
        FormField::Phone,
        FormField::Website,
        FormField::Email,
        FormField::OpeningHours,
        FormField::Cuisine,
    ];

    pub fn key(self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::HouseNumber => "addr:housenumber",
            FormField::Street => "addr:street",
            FormField::City => "addr:city",
            FormField::State => "addr:state",
            FormField::Postcode => "addr:postcode",
            FormField::Country => "addr:country",
            FormField::Phone => "phone",
            FormField::Website => "website",
            FormField::Email => "email",
            FormField::OpeningHours => "opening_hours",
            FormField::Cuisine => "cuisine",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::HouseNumber => "House Number",
            FormField::Street => "Street",
            FormField::City => "City",
            FormField::State => "State/Province",
            FormField::Postcode => "Postcode",
            FormField::Country => "Country",
            FormField::Phone => "Phone",
            FormField::Website => "Website",
            FormField::Email => "Email",
            FormField::OpeningHours => "Opening Hours",
            FormField::Cuisine => "Cuisine",
        }
    }

    pub fn from_key(key: &str) -> Option<FormField> {
        FormField::ALL.into_iter().find(|field| field.key() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_resolve() {
        assert_eq!(label_for(SHOP_TYPES, "bakery"), Some("Bakery"));
        assert_eq!(label_for(AMENITY_TYPES, "taxi"), Some("Taxi Stand"));
        assert_eq!(label_for(CBTC_TYPES, "maybe"), None);
    }

    #[test]
    fn field_keys_round_trip() {
        for field in FormField::ALL {
            assert_eq!(FormField::from_key(field.key()), Some(field));
        }
        assert_eq!(FormField::from_key("shop"), None);
    }
}
