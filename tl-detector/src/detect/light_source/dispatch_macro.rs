macro_rules! define_light_source {
    ($($name: ident => $to: ident, )*) => {
        /// The light color capability selected once at startup.
        pub enum LightSource {
            $(
                $name($to),
            )*
        }

        impl LightColorSource for LightSource {
            async fn classify(
                &self,
                light: Option<&TrafficLight>,
                frame: Option<&RgbFrame>,
            ) -> LightColor {
                match self {
                    $(
                        LightSource::$name(source) => source.classify(light, frame).await,
                    )*
                }
            }
        }

        impl LightSource {
            pub fn name(&self) -> &'static str {
                match self {
                    $(
                        LightSource::$name(_) => stringify!($name),
                    )*
                }
            }
        }
    };
}
