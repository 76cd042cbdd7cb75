//! Run this example with `OPENAI_API_KEY=`

use thin_openai::{
    endpoints::{
        chat::{ChatCompletion, Model},
        embeddings::{Embeddings, EmbeddingsModel},
        images::ImageGeneration,
    },
    system_message, user_message, EnvironmentAuthTokenProvider, OpenAI,
};

fn main() {
    let client = OpenAI::new(EnvironmentAuthTokenProvider).unwrap();

    let chat_completion = ChatCompletion::model(Model::Gpt4oMini)
        .messages(vec![
            system_message!("Extract the first and last name from the provided message."),
            user_message!("Hello, my name is John Doe."),
        ])
        .temperature(0.1)
        .build();

    let name = client
        .req(&chat_completion)
        .unwrap()
        .take_first_choice()
        .expect("No choices")
        .message()
        .expect("Model generated a refusal");
    println!("{name}");

    let embedding = client
        .req(
            &Embeddings::model(EmbeddingsModel::TextEmbedding3Small)
                .input(&name)
                .build(),
        )
        .unwrap()
        .embedding();
    println!("embedding has {} dimensions", embedding.len());

    let images = client
        .req(&ImageGeneration::prompt("a portrait of John Doe").build())
        .unwrap()
        .images();
    println!("{images:?}");
}
